use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScannerErrorCode {
    /// The user (or policy) refused camera access.
    PermissionDenied,
    /// No usable camera, or the camera could not be started.
    DeviceUnavailable,
    /// A single frame could not be rasterised or analysed.
    Detection,
    Internal,
}

impl ScannerErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScannerErrorCode::PermissionDenied => "scanner/permission-denied",
            ScannerErrorCode::DeviceUnavailable => "scanner/device-unavailable",
            ScannerErrorCode::Detection => "scanner/detection",
            ScannerErrorCode::Internal => "scanner/internal",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerError {
    pub code: ScannerErrorCode,
    message: String,
}

impl ScannerError {
    pub fn new(code: ScannerErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Camera acquisition failures, which send the user to manual entry.
    pub fn is_device_error(&self) -> bool {
        matches!(
            self.code,
            ScannerErrorCode::PermissionDenied | ScannerErrorCode::DeviceUnavailable
        )
    }
}

impl Display for ScannerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for ScannerError {}

pub type ScannerResult<T> = Result<T, ScannerError>;

pub fn permission_denied(message: impl Into<String>) -> ScannerError {
    ScannerError::new(ScannerErrorCode::PermissionDenied, message)
}

pub fn device_unavailable(message: impl Into<String>) -> ScannerError {
    ScannerError::new(ScannerErrorCode::DeviceUnavailable, message)
}

pub fn detection_error(message: impl Into<String>) -> ScannerError {
    ScannerError::new(ScannerErrorCode::Detection, message)
}

pub fn internal_error(message: impl Into<String>) -> ScannerError {
    ScannerError::new(ScannerErrorCode::Internal, message)
}
