use std::fmt::{Display, Formatter};

use crate::gateway::GatewayError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanShareError {
    /// `confirm_consent` was called while no consent prompt is open.
    NoConsentPending,
    /// A share is already submitted or being polled for.
    SubmissionPending,
    /// The share call failed; the consent prompt stays open for a retry.
    Submission(GatewayError),
    /// A newer scan, dismissal or close replaced the operation mid-flight.
    Superseded,
    InvalidSettings(String),
}

impl ScanShareError {
    pub fn code_str(&self) -> &'static str {
        match self {
            ScanShareError::NoConsentPending => "scan-share/no-consent-pending",
            ScanShareError::SubmissionPending => "scan-share/submission-pending",
            ScanShareError::Submission(_) => "scan-share/submission-failed",
            ScanShareError::Superseded => "scan-share/superseded",
            ScanShareError::InvalidSettings(_) => "scan-share/invalid-settings",
        }
    }

    /// Only submission failures are meant to reach the user.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, ScanShareError::Submission(_))
    }
}

impl Display for ScanShareError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanShareError::NoConsentPending => write!(f, "no consent prompt is open"),
            ScanShareError::SubmissionPending => write!(f, "a share is already in progress"),
            ScanShareError::Submission(err) => write!(f, "failed to share profile: {err}"),
            ScanShareError::Superseded => write!(f, "the scan was replaced before it finished"),
            ScanShareError::InvalidSettings(message) => write!(f, "invalid settings: {message}"),
        }
    }
}

impl std::error::Error for ScanShareError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanShareError::Submission(err) => Some(err),
            _ => None,
        }
    }
}

pub type ScanShareResult<T> = Result<T, ScanShareError>;

pub fn invalid_settings(message: impl Into<String>) -> ScanShareError {
    ScanShareError::InvalidSettings(message.into())
}
