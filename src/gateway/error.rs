use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GatewayErrorCode {
    /// The request never produced an HTTP response.
    Network,
    /// The backend answered with a non-success status.
    Status,
    /// The backend rejected the caller's credentials (401/403).
    Unauthorized,
    /// The response body could not be decoded.
    Decode,
    InvalidArgument,
    Internal,
}

impl GatewayErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayErrorCode::Network => "gateway/network",
            GatewayErrorCode::Status => "gateway/status",
            GatewayErrorCode::Unauthorized => "gateway/unauthorized",
            GatewayErrorCode::Decode => "gateway/decode",
            GatewayErrorCode::InvalidArgument => "gateway/invalid-argument",
            GatewayErrorCode::Internal => "gateway/internal",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayError {
    pub code: GatewayErrorCode,
    message: String,
    http_status: Option<u16>,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            http_status: None,
        }
    }

    pub fn with_status(mut self, http_status: u16) -> Self {
        self.http_status = Some(http_status);
        self
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for GatewayError {}

pub type GatewayResult<T> = Result<T, GatewayError>;

pub fn network_error(message: impl Into<String>) -> GatewayError {
    GatewayError::new(GatewayErrorCode::Network, message)
}

pub fn decode_error(message: impl Into<String>) -> GatewayError {
    GatewayError::new(GatewayErrorCode::Decode, message)
}

pub fn invalid_argument(message: impl Into<String>) -> GatewayError {
    GatewayError::new(GatewayErrorCode::InvalidArgument, message)
}

pub fn internal_error(message: impl Into<String>) -> GatewayError {
    GatewayError::new(GatewayErrorCode::Internal, message)
}

/// Maps a non-success HTTP status to a tagged error, preferring the backend's own message.
pub fn error_for_status(http_status: u16, backend_message: Option<&str>) -> GatewayError {
    let code = match http_status {
        401 | 403 => GatewayErrorCode::Unauthorized,
        _ => GatewayErrorCode::Status,
    };
    let message = backend_message
        .filter(|message| !message.trim().is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| format!("gateway returned HTTP {http_status}"));
    GatewayError::new(code, message).with_status(http_status)
}
