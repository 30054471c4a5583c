//! The check-in flow: scan a counter code, reuse or request a token, and wait for it.

mod consent;
mod error;
mod logger;
mod page;
mod session;
mod settings;
mod state;

pub use consent::{ConsentRow, ConsentSummary, PatientProfile};
pub use error::{ScanShareError, ScanShareResult};
pub use page::ScanPage;
pub use session::ScanShareSession;
pub use settings::{
    ScanShareSettings, ScanShareSettingsUpdate, DEFAULT_COUNTDOWN_TICK_MILLIS,
    DEFAULT_GEOLOCATION_TIMEOUT_MILLIS, DEFAULT_POLL_INTERVAL_MILLIS, DEFAULT_RECENT_TOKEN_LIMIT,
};
pub use state::{DecodeOutcome, Dialog, SessionState};
