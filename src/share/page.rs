use std::sync::{Arc, Mutex};

use crate::platform::cancel::CancellationToken;
use crate::platform::runtime::spawn_detached;
use crate::scanner::{CaptureLoop, CaptureOutcome, CaptureStatus, ScannerError, ScannerResult};
use crate::share::logger::LOGGER;
use crate::share::session::ScanShareSession;
use crate::share::state::DecodeOutcome;
use crate::util::Unsubscribe;

/// The scan tab: camera capture feeding a [`ScanShareSession`], with a typed-text fallback.
///
/// Dropping the page stops the camera and abandons the session's in-flight work.
pub struct ScanPage {
    session: ScanShareSession,
    capture: Arc<CaptureLoop>,
    scan_scope: Mutex<CancellationToken>,
    camera_error: Arc<Mutex<Option<ScannerError>>>,
}

impl ScanPage {
    pub fn new(session: ScanShareSession, capture: CaptureLoop) -> Self {
        Self {
            session,
            capture: Arc::new(capture),
            scan_scope: Mutex::new(CancellationToken::new()),
            camera_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn session(&self) -> &ScanShareSession {
        &self.session
    }

    pub fn capture_status(&self) -> CaptureStatus {
        self.capture.status()
    }

    pub fn on_capture_status<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&CaptureStatus) + Send + Sync + 'static,
    {
        self.capture.on_status_changed(listener)
    }

    /// Why the camera could not be used, if it could not.
    pub fn camera_error(&self) -> Option<ScannerError> {
        self.camera_error.lock().unwrap().clone()
    }

    /// `true` once the camera failed and only typed input is left.
    pub fn manual_entry_required(&self) -> bool {
        self.camera_error().is_some()
    }

    fn restart_scope(&self) -> CancellationToken {
        let mut scope = self.scan_scope.lock().unwrap();
        scope.cancel();
        *scope = CancellationToken::new();
        scope.clone()
    }

    /// Runs one capture and hands the decoded text to the session.
    ///
    /// `Ok(None)` means the scan was stopped before a code was seen.
    pub async fn scan(&self) -> ScannerResult<Option<DecodeOutcome>> {
        let cancel = self.restart_scope();
        scan_with(&self.capture, &self.session, &self.camera_error, &cancel).await
    }

    /// Scans in the background until a counter code is accepted or scanning is stopped.
    /// Codes that are not counter codes are skipped. The first call also starts locating the
    /// device.
    pub fn start(&self) {
        self.session.locate();
        let cancel = self.restart_scope();
        let capture = Arc::clone(&self.capture);
        let session = self.session.clone();
        let camera_error = Arc::clone(&self.camera_error);

        spawn_detached(async move {
            loop {
                match scan_with(&capture, &session, &camera_error, &cancel).await {
                    Ok(Some(DecodeOutcome::Rejected(_))) if !cancel.is_cancelled() => continue,
                    _ => break,
                }
            }
        });
    }

    pub fn stop_scanning(&self) {
        self.scan_scope.lock().unwrap().cancel();
    }

    /// Manual-entry fallback. An accepted payload also stops the camera.
    pub async fn submit_manual_text(&self, text: &str) -> DecodeOutcome {
        let outcome = self.session.handle_decoded(text).await;
        if outcome.is_accepted() {
            self.stop_scanning();
        }
        outcome
    }

    pub fn close(&self) {
        self.stop_scanning();
        self.session.close();
    }
}

impl Drop for ScanPage {
    fn drop(&mut self) {
        self.close();
    }
}

async fn scan_with(
    capture: &CaptureLoop,
    session: &ScanShareSession,
    camera_error: &Mutex<Option<ScannerError>>,
    cancel: &CancellationToken,
) -> ScannerResult<Option<DecodeOutcome>> {
    match capture.run(cancel).await {
        Ok(CaptureOutcome::Decoded(text)) => Ok(Some(session.handle_decoded(&text).await)),
        Ok(CaptureOutcome::Cancelled) => Ok(None),
        Err(err) => {
            LOGGER.info(format!("offering manual entry: {err}"));
            *camera_error.lock().unwrap() = Some(err.clone());
            Err(err)
        }
    }
}
