//! Browser bindings: `getUserMedia` camera, the Shape Detection `BarcodeDetector` and
//! `requestAnimationFrame` pacing.

use std::cell::Cell;

use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{Clamped, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, ImageData, MediaStream,
    MediaStreamConstraints, MediaStreamTrack,
};

use crate::platform::browser::{dom_exception_name, format_js_error, property};
use crate::platform::runtime::sleep;
use crate::scanner::constants::NATIVE_FRAME_INTERVAL;
use crate::scanner::device::{
    BarcodeDetector, CameraDevice, DetectorFactory, FrameClock, VideoStream,
};
use crate::scanner::error::{
    detection_error, device_unavailable, internal_error, permission_denied, ScannerError,
    ScannerResult,
};
use crate::scanner::logger::LOGGER;
use crate::scanner::types::{BarcodeFormat, DetectedBarcode, FrameBuffer, MediaConstraints};

fn set(target: &Object, key: &str, value: &JsValue) -> ScannerResult<()> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|err| internal_error(format_js_error("Reflect.set", &err)))
}

fn acquisition_error(err: &JsValue) -> ScannerError {
    let message = format_js_error("getUserMedia", err);
    match dom_exception_name(err).as_deref() {
        Some("NotAllowedError") | Some("SecurityError") => permission_denied(message),
        _ => device_unavailable(message),
    }
}

fn video_constraints(constraints: &MediaConstraints) -> ScannerResult<MediaStreamConstraints> {
    let facing = Object::new();
    set(&facing, "ideal", &JsValue::from_str(constraints.facing_mode.as_str()))?;
    let video = Object::new();
    set(&video, "facingMode", &facing)?;
    let request = Object::new();
    set(&request, "video", &video)?;
    set(&request, "audio", &JsValue::FALSE)?;
    Ok(request.unchecked_into())
}

/// Camera that renders its stream into a caller-provided `<video>` element.
pub struct WebCamera {
    video: HtmlVideoElement,
}

impl WebCamera {
    pub fn new(video: HtmlVideoElement) -> Self {
        Self { video }
    }

    pub fn video(&self) -> &HtmlVideoElement {
        &self.video
    }
}

#[async_trait(?Send)]
impl CameraDevice for WebCamera {
    async fn open(&self, constraints: &MediaConstraints) -> ScannerResult<Box<dyn VideoStream>> {
        let window =
            web_sys::window().ok_or_else(|| device_unavailable("window is not available"))?;
        let media_devices = window
            .navigator()
            .media_devices()
            .map_err(|err| acquisition_error(&err))?;
        let promise = media_devices
            .get_user_media_with_constraints(&video_constraints(constraints)?)
            .map_err(|err| acquisition_error(&err))?;
        let stream: MediaStream = JsFuture::from(promise)
            .await
            .map_err(|err| acquisition_error(&err))?
            .dyn_into()
            .map_err(|_| internal_error("getUserMedia did not resolve to a MediaStream"))?;

        // Dropping `opened` stops its tracks, including when this future is cancelled
        // while playback is still starting.
        let opened = WebVideoStream::attach(stream, self.video.clone())?;
        start_playback(&self.video).await?;
        Ok(Box::new(opened))
    }
}

async fn start_playback(video: &HtmlVideoElement) -> ScannerResult<()> {
    video.set_muted(true);
    if let Err(err) = video.set_attribute("playsinline", "true") {
        LOGGER.debug(format_js_error("setAttribute(playsinline)", &err));
    }
    let playback = video
        .play()
        .map_err(|err| device_unavailable(format_js_error("video.play", &err)))?;
    JsFuture::from(playback)
        .await
        .map(|_| ())
        .map_err(|err| device_unavailable(format_js_error("video.play", &err)))
}

struct WebVideoStream {
    stream: MediaStream,
    video: HtmlVideoElement,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    stopped: Cell<bool>,
}

impl WebVideoStream {
    fn attach(stream: MediaStream, video: HtmlVideoElement) -> ScannerResult<Self> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| internal_error("document is not available"))?;
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(|err| internal_error(format_js_error("createElement", &err)))?
            .dyn_into()
            .map_err(|_| internal_error("created element is not a canvas"))?;
        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|err| internal_error(format_js_error("getContext", &err)))?
            .ok_or_else(|| internal_error("2d canvas context is not available"))?
            .dyn_into()
            .map_err(|_| internal_error("unexpected canvas context type"))?;

        video.set_src_object(Some(&stream));
        Ok(Self {
            stream,
            video,
            canvas,
            context,
            stopped: Cell::new(false),
        })
    }
}

impl VideoStream for WebVideoStream {
    fn dimensions(&self) -> Option<(u32, u32)> {
        let (width, height) = (self.video.video_width(), self.video.video_height());
        (width > 0 && height > 0).then_some((width, height))
    }

    fn draw_into(&self, frame: &mut FrameBuffer) -> ScannerResult<()> {
        let (width, height) = (frame.width(), frame.height());
        if self.canvas.width() != width || self.canvas.height() != height {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
        }
        self.context
            .draw_image_with_html_video_element(&self.video, 0.0, 0.0)
            .map_err(|err| detection_error(format_js_error("drawImage", &err)))?;
        let image = self
            .context
            .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))
            .map_err(|err| detection_error(format_js_error("getImageData", &err)))?;
        let data = image.data();
        let pixels = frame.pixels_mut();
        if data.len() != pixels.len() {
            return Err(detection_error("canvas raster does not match the frame size"));
        }
        pixels.copy_from_slice(&data);
        Ok(())
    }

    fn stop(&self) {
        if self.stopped.replace(true) {
            return;
        }
        for track in self.stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
        self.video.set_src_object(None);
    }
}

impl Drop for WebVideoStream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Uses `window.BarcodeDetector` where the browser ships one.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebBarcodeDetectorFactory;

impl WebBarcodeDetectorFactory {
    pub fn new() -> Self {
        Self
    }

    fn constructor() -> Option<Function> {
        let window = web_sys::window()?;
        property(&window, "BarcodeDetector")?.dyn_into().ok()
    }
}

#[async_trait(?Send)]
impl DetectorFactory for WebBarcodeDetectorFactory {
    async fn supported_formats(&self) -> ScannerResult<Vec<BarcodeFormat>> {
        let Some(constructor) = Self::constructor() else {
            return Ok(Vec::new());
        };
        let query: Function = property(&constructor, "getSupportedFormats")
            .and_then(|value| value.dyn_into().ok())
            .ok_or_else(|| internal_error("BarcodeDetector.getSupportedFormats is missing"))?;
        let promise: Promise = query
            .call0(&constructor)
            .map_err(|err| internal_error(format_js_error("getSupportedFormats", &err)))?
            .dyn_into()
            .map_err(|_| internal_error("getSupportedFormats did not return a promise"))?;
        let formats = JsFuture::from(promise)
            .await
            .map_err(|err| internal_error(format_js_error("getSupportedFormats", &err)))?;
        Ok(Array::from(&formats)
            .iter()
            .filter_map(|value| value.as_string())
            .map(|name| BarcodeFormat::from_name(&name))
            .collect())
    }

    fn create(&self, formats: &[BarcodeFormat]) -> ScannerResult<Box<dyn BarcodeDetector>> {
        let constructor = Self::constructor()
            .ok_or_else(|| internal_error("BarcodeDetector is not available"))?;
        let names: Array = formats
            .iter()
            .map(|format| JsValue::from_str(format.as_str()))
            .collect();
        let options = Object::new();
        set(&options, "formats", &names)?;
        let detector = Reflect::construct(&constructor, &Array::of1(&options))
            .map_err(|err| internal_error(format_js_error("new BarcodeDetector", &err)))?;
        Ok(Box::new(WebBarcodeDetector { detector }))
    }
}

struct WebBarcodeDetector {
    detector: JsValue,
}

#[async_trait(?Send)]
impl BarcodeDetector for WebBarcodeDetector {
    async fn detect(&self, frame: &FrameBuffer) -> ScannerResult<Vec<DetectedBarcode>> {
        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(frame.pixels()),
            frame.width(),
            frame.height(),
        )
        .map_err(|err| detection_error(format_js_error("new ImageData", &err)))?;
        let detect: Function = property(&self.detector, "detect")
            .and_then(|value| value.dyn_into().ok())
            .ok_or_else(|| internal_error("BarcodeDetector.detect is missing"))?;
        let promise: Promise = detect
            .call1(&self.detector, &image)
            .map_err(|err| detection_error(format_js_error("detect", &err)))?
            .dyn_into()
            .map_err(|_| detection_error("detect did not return a promise"))?;
        let results = JsFuture::from(promise)
            .await
            .map_err(|err| detection_error(format_js_error("detect", &err)))?;

        Ok(Array::from(&results)
            .iter()
            .map(|code| DetectedBarcode {
                raw_value: property(&code, "rawValue")
                    .and_then(|value| value.as_string())
                    .unwrap_or_default(),
                format: property(&code, "format")
                    .and_then(|value| value.as_string())
                    .map(|name| BarcodeFormat::from_name(&name))
                    .unwrap_or(BarcodeFormat::QrCode),
            })
            .collect())
    }
}

/// Resolves on the next display refresh; falls back to a fixed interval without a window.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnimationFrameClock;

impl AnimationFrameClock {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl FrameClock for AnimationFrameClock {
    async fn next_frame(&self) {
        let Some(window) = web_sys::window() else {
            sleep(NATIVE_FRAME_INTERVAL).await;
            return;
        };
        let (sender, receiver) = async_channel::bounded::<()>(1);
        let callback = Closure::once_into_js(move |_timestamp: f64| {
            let _ = sender.try_send(());
        });
        match window.request_animation_frame(callback.unchecked_ref()) {
            Ok(_) => {
                let _ = receiver.recv().await;
            }
            Err(_) => sleep(NATIVE_FRAME_INTERVAL).await,
        }
    }
}

unsafe impl Send for WebCamera {}
unsafe impl Sync for WebCamera {}
unsafe impl Send for WebVideoStream {}
unsafe impl Sync for WebVideoStream {}
unsafe impl Send for WebBarcodeDetector {}
unsafe impl Sync for WebBarcodeDetector {}
