use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::scanner::{
    BarcodeDetector, BarcodeFormat, CameraDevice, DetectedBarcode, DetectorFactory, FrameBuffer,
    MediaConstraints, ScannerError, ScannerResult, VideoStream,
};

pub fn qr(raw_value: &str) -> DetectedBarcode {
    DetectedBarcode {
        raw_value: raw_value.to_owned(),
        format: BarcodeFormat::QrCode,
    }
}

enum CameraMode {
    Ready,
    Failing(ScannerError),
    /// Acquisition never resolves, like an unanswered permission prompt.
    Pending,
}

struct FakeCameraInner {
    mode: CameraMode,
    opens: AtomicUsize,
    stops: Arc<AtomicUsize>,
}

/// Camera whose streams count how many times they were stopped.
#[derive(Clone)]
pub struct FakeCamera {
    inner: Arc<FakeCameraInner>,
}

impl FakeCamera {
    fn with_mode(mode: CameraMode) -> Self {
        Self {
            inner: Arc::new(FakeCameraInner {
                mode,
                opens: AtomicUsize::new(0),
                stops: Arc::new(AtomicUsize::new(0)),
            }),
        }
    }

    pub fn new() -> Self {
        Self::with_mode(CameraMode::Ready)
    }

    pub fn failing(error: ScannerError) -> Self {
        Self::with_mode(CameraMode::Failing(error))
    }

    pub fn pending() -> Self {
        Self::with_mode(CameraMode::Pending)
    }

    pub fn open_count(&self) -> usize {
        self.inner.opens.load(Ordering::SeqCst)
    }

    /// Number of streams stopped, each counted once.
    pub fn stop_count(&self) -> usize {
        self.inner.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraDevice for FakeCamera {
    async fn open(&self, _constraints: &MediaConstraints) -> ScannerResult<Box<dyn VideoStream>> {
        self.inner.opens.fetch_add(1, Ordering::SeqCst);
        match &self.inner.mode {
            CameraMode::Ready => Ok(Box::new(FakeStream {
                stopped: AtomicBool::new(false),
                stops: Arc::clone(&self.inner.stops),
            })),
            CameraMode::Failing(error) => Err(error.clone()),
            CameraMode::Pending => futures::future::pending().await,
        }
    }
}

struct FakeStream {
    stopped: AtomicBool,
    stops: Arc<AtomicUsize>,
}

impl VideoStream for FakeStream {
    fn dimensions(&self) -> Option<(u32, u32)> {
        Some((4, 4))
    }

    fn draw_into(&self, frame: &mut FrameBuffer) -> ScannerResult<()> {
        frame.pixels_mut().fill(0x80);
        Ok(())
    }

    fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }
}

type DetectionScript = Arc<Mutex<VecDeque<ScannerResult<Vec<DetectedBarcode>>>>>;

/// Detector replaying scripted results, then reporting empty frames.
pub struct FakeDetectorFactory {
    formats: Vec<BarcodeFormat>,
    script: DetectionScript,
}

impl FakeDetectorFactory {
    pub fn qr() -> Self {
        Self {
            formats: vec![BarcodeFormat::QrCode],
            script: DetectionScript::default(),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            formats: vec![BarcodeFormat::from_name("ean_13")],
            script: DetectionScript::default(),
        }
    }

    pub fn script(self, results: Vec<ScannerResult<Vec<DetectedBarcode>>>) -> Self {
        self.script.lock().unwrap().extend(results);
        self
    }
}

#[async_trait]
impl DetectorFactory for FakeDetectorFactory {
    async fn supported_formats(&self) -> ScannerResult<Vec<BarcodeFormat>> {
        Ok(self.formats.clone())
    }

    fn create(&self, _formats: &[BarcodeFormat]) -> ScannerResult<Box<dyn BarcodeDetector>> {
        Ok(Box::new(FakeDetector {
            script: Arc::clone(&self.script),
        }))
    }
}

struct FakeDetector {
    script: DetectionScript,
}

#[async_trait]
impl BarcodeDetector for FakeDetector {
    async fn detect(&self, frame: &FrameBuffer) -> ScannerResult<Vec<DetectedBarcode>> {
        assert!(!frame.is_empty());
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(Vec::new()))
    }
}
