use std::time::Duration;

use async_trait::async_trait;

use crate::platform::runtime::sleep;
use crate::scanner::constants::NATIVE_FRAME_INTERVAL;
use crate::scanner::error::ScannerResult;
use crate::scanner::types::{BarcodeFormat, DetectedBarcode, FrameBuffer, MediaConstraints};

/// Source of live video streams.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait CameraDevice: Send + Sync {
    async fn open(&self, constraints: &MediaConstraints) -> ScannerResult<Box<dyn VideoStream>>;
}

pub trait VideoStream: Send + Sync {
    /// Native resolution, or `None` while the first frame is not decoded yet.
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Copies the current frame into `frame`, which is already sized to [`dimensions`](Self::dimensions).
    fn draw_into(&self, frame: &mut FrameBuffer) -> ScannerResult<()>;

    /// Stops every track. Must be idempotent.
    fn stop(&self);
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait BarcodeDetector: Send + Sync {
    async fn detect(&self, frame: &FrameBuffer) -> ScannerResult<Vec<DetectedBarcode>>;
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait DetectorFactory: Send + Sync {
    async fn supported_formats(&self) -> ScannerResult<Vec<BarcodeFormat>>;

    fn create(&self, formats: &[BarcodeFormat]) -> ScannerResult<Box<dyn BarcodeDetector>>;
}

/// Paces frame sampling.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait FrameClock: Send + Sync {
    async fn next_frame(&self);
}

#[derive(Clone, Copy, Debug)]
pub struct IntervalFrameClock {
    interval: Duration,
}

impl IntervalFrameClock {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for IntervalFrameClock {
    fn default() -> Self {
        Self::new(NATIVE_FRAME_INTERVAL)
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl FrameClock for IntervalFrameClock {
    async fn next_frame(&self) {
        sleep(self.interval).await;
    }
}

/// Factory for hosts without a barcode decoder; the capture loop then runs decoder-less.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBarcodeDetection;

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl DetectorFactory for NoBarcodeDetection {
    async fn supported_formats(&self) -> ScannerResult<Vec<BarcodeFormat>> {
        Ok(Vec::new())
    }

    fn create(&self, formats: &[BarcodeFormat]) -> ScannerResult<Box<dyn BarcodeDetector>> {
        Err(crate::scanner::error::internal_error(format!(
            "no decoder for {}",
            formats
                .iter()
                .map(BarcodeFormat::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}

/// Owns an open stream and stops it on every exit path.
pub(crate) struct StreamGuard {
    stream: Box<dyn VideoStream>,
}

impl StreamGuard {
    pub(crate) fn new(stream: Box<dyn VideoStream>) -> Self {
        Self { stream }
    }

    pub(crate) fn stream(&self) -> &dyn VideoStream {
        self.stream.as_ref()
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.stream.stop();
    }
}
