use std::sync::{Arc, Mutex};

use crate::platform::cancel::CancellationToken;
use crate::platform::runtime::until_cancelled;
use crate::scanner::device::{
    BarcodeDetector, CameraDevice, DetectorFactory, FrameClock, StreamGuard,
};
use crate::scanner::error::ScannerResult;
use crate::scanner::logger::LOGGER;
use crate::scanner::types::{
    BarcodeFormat, CaptureOutcome, CaptureStatus, DecoderAvailability, FrameBuffer,
    MediaConstraints,
};
use crate::util::{Listeners, Unsubscribe};

/// Samples camera frames and decodes the first QR code it sees.
pub struct CaptureLoop {
    camera: Arc<dyn CameraDevice>,
    detectors: Arc<dyn DetectorFactory>,
    clock: Arc<dyn FrameClock>,
    constraints: MediaConstraints,
    status: Mutex<CaptureStatus>,
    listeners: Listeners<CaptureStatus>,
}

impl CaptureLoop {
    pub fn new(
        camera: Arc<dyn CameraDevice>,
        detectors: Arc<dyn DetectorFactory>,
        clock: Arc<dyn FrameClock>,
    ) -> Self {
        Self {
            camera,
            detectors,
            clock,
            constraints: MediaConstraints::rear_camera(),
            status: Mutex::new(CaptureStatus::Starting),
            listeners: Listeners::new(),
        }
    }

    pub fn with_constraints(mut self, constraints: MediaConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn status(&self) -> CaptureStatus {
        self.status.lock().unwrap().clone()
    }

    pub fn on_status_changed<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&CaptureStatus) + Send + Sync + 'static,
    {
        self.listeners.add(listener)
    }

    fn publish(&self, status: CaptureStatus) {
        *self.status.lock().unwrap() = status.clone();
        self.listeners.notify(&status);
    }

    /// Runs until a code is decoded, `cancel` fires, or the camera cannot be opened.
    ///
    /// Device errors are returned so the caller can fall back to manual entry. The stream is
    /// stopped before this returns, and also if the future is dropped early.
    pub async fn run(&self, cancel: &CancellationToken) -> ScannerResult<CaptureOutcome> {
        self.publish(CaptureStatus::Starting);

        let stream = match until_cancelled(self.camera.open(&self.constraints), cancel).await {
            None => {
                self.publish(CaptureStatus::Finished);
                return Ok(CaptureOutcome::Cancelled);
            }
            Some(Err(err)) => {
                LOGGER.warn(format!("camera unavailable, falling back to manual entry: {err}"));
                self.publish(CaptureStatus::Unavailable {
                    reason: err.to_string(),
                });
                return Err(err);
            }
            Some(Ok(stream)) => StreamGuard::new(stream),
        };

        let detector = match until_cancelled(self.create_detector(), cancel).await {
            None => {
                drop(stream);
                self.publish(CaptureStatus::Finished);
                return Ok(CaptureOutcome::Cancelled);
            }
            Some(detector) => detector,
        };

        let outcome = match detector {
            Some(detector) => {
                self.publish(CaptureStatus::Live {
                    decoder: DecoderAvailability::Available,
                });
                self.sample(&stream, detector.as_ref(), cancel).await
            }
            None => {
                self.publish(CaptureStatus::Live {
                    decoder: DecoderAvailability::Unavailable,
                });
                cancel.cancelled().await;
                CaptureOutcome::Cancelled
            }
        };

        drop(stream);
        self.publish(CaptureStatus::Finished);
        Ok(outcome)
    }

    async fn create_detector(&self) -> Option<Box<dyn BarcodeDetector>> {
        let formats = match self.detectors.supported_formats().await {
            Ok(formats) => formats,
            Err(err) => {
                LOGGER.warn(format!("could not query barcode formats: {err}"));
                return None;
            }
        };
        if !formats.contains(&BarcodeFormat::QrCode) {
            LOGGER.info("QR decoding is not supported on this device");
            return None;
        }
        match self.detectors.create(&[BarcodeFormat::QrCode]) {
            Ok(detector) => Some(detector),
            Err(err) => {
                LOGGER.warn(format!("could not create QR detector: {err}"));
                None
            }
        }
    }

    async fn sample(
        &self,
        stream: &StreamGuard,
        detector: &dyn BarcodeDetector,
        cancel: &CancellationToken,
    ) -> CaptureOutcome {
        let mut frame = FrameBuffer::default();
        loop {
            if until_cancelled(self.clock.next_frame(), cancel).await.is_none() {
                return CaptureOutcome::Cancelled;
            }

            let Some((width, height)) = stream.stream().dimensions() else {
                continue;
            };
            frame.resize(width, height);
            if let Err(err) = stream.stream().draw_into(&mut frame) {
                log::debug!("skipping frame: {err}");
                continue;
            }

            match until_cancelled(detector.detect(&frame), cancel).await {
                None => return CaptureOutcome::Cancelled,
                Some(Ok(codes)) => match codes.into_iter().next() {
                    Some(code) if !code.raw_value.is_empty() => {
                        LOGGER.debug(format!("decoded {} code", code.format));
                        return CaptureOutcome::Decoded(code.raw_value);
                    }
                    _ => {}
                },
                Some(Err(err)) => log::debug!("detection failed on frame: {err}"),
            }
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::platform::runtime::{sleep, spawn_detached};
    use crate::scanner::error::{detection_error, permission_denied, ScannerErrorCode};
    use crate::scanner::IntervalFrameClock;
    use crate::test_support::{qr, FakeCamera, FakeDetectorFactory};
    use std::time::Duration;

    fn capture(camera: &FakeCamera, detectors: FakeDetectorFactory) -> CaptureLoop {
        CaptureLoop::new(
            Arc::new(camera.clone()),
            Arc::new(detectors),
            Arc::new(IntervalFrameClock::new(Duration::from_millis(1))),
        )
    }

    fn record_statuses(capture: &CaptureLoop) -> Arc<Mutex<Vec<CaptureStatus>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _keep = capture.on_status_changed(move |status| sink.lock().unwrap().push(status.clone()));
        seen
    }

    #[tokio::test(flavor = "current_thread")]
    async fn decodes_first_frame_with_code_and_stops_stream() {
        let camera = FakeCamera::new();
        let detectors = FakeDetectorFactory::qr().script(vec![
            Err(detection_error("blurry")),
            Ok(vec![]),
            Ok(vec![qr("https://x/share-profile?hip-id=F&counter-id=C"), qr("second")]),
        ]);
        let capture = capture(&camera, detectors);
        let statuses = record_statuses(&capture);

        let outcome = capture.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(
            outcome,
            CaptureOutcome::Decoded("https://x/share-profile?hip-id=F&counter-id=C".into())
        );
        assert_eq!(camera.stop_count(), 1);
        assert_eq!(
            statuses.lock().unwrap().as_slice(),
            &[
                CaptureStatus::Starting,
                CaptureStatus::Live {
                    decoder: DecoderAvailability::Available
                },
                CaptureStatus::Finished,
            ]
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn empty_raw_value_keeps_sampling() {
        let camera = FakeCamera::new();
        let detectors = FakeDetectorFactory::qr().script(vec![Ok(vec![qr("")]), Ok(vec![qr("X")])]);
        let capture = capture(&camera, detectors);

        let outcome = capture.run(&CancellationToken::new()).await.unwrap();
        assert_eq!(outcome, CaptureOutcome::Decoded("X".into()));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn permission_denied_is_reported_not_fatal() {
        let camera = FakeCamera::failing(permission_denied("NotAllowedError"));
        let capture = capture(&camera, FakeDetectorFactory::qr());

        let err = capture.run(&CancellationToken::new()).await.unwrap_err();

        assert_eq!(err.code, ScannerErrorCode::PermissionDenied);
        assert!(err.is_device_error());
        assert!(matches!(capture.status(), CaptureStatus::Unavailable { .. }));
        assert_eq!(camera.stop_count(), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn missing_qr_support_runs_decoder_less_until_cancelled() {
        let camera = FakeCamera::new();
        let capture = Arc::new(capture(&camera, FakeDetectorFactory::unsupported()));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        spawn_detached(async move {
            sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });
        let statuses = record_statuses(&capture);
        let outcome = capture.run(&cancel).await.unwrap();

        assert_eq!(outcome, CaptureOutcome::Cancelled);
        assert!(statuses.lock().unwrap().contains(&CaptureStatus::Live {
            decoder: DecoderAvailability::Unavailable
        }));
        assert_eq!(camera.stop_count(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn cancellation_during_camera_acquisition() {
        let camera = FakeCamera::pending();
        let capture = capture(&camera, FakeDetectorFactory::qr());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        spawn_detached(async move {
            sleep(Duration::from_millis(5)).await;
            trigger.cancel();
        });

        assert_eq!(capture.run(&cancel).await.unwrap(), CaptureOutcome::Cancelled);
        assert_eq!(capture.status(), CaptureStatus::Finished);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn dropping_the_run_future_stops_the_stream() {
        let camera = FakeCamera::new();
        let capture = capture(&camera, FakeDetectorFactory::qr());
        let cancel = CancellationToken::new();

        let run = capture.run(&cancel);
        let _ = crate::platform::runtime::with_timeout(run, Duration::from_millis(10)).await;

        assert_eq!(camera.stop_count(), 1);
    }
}
