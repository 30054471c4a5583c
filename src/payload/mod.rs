//! Validation of decoded QR text into a [`ScannedIdentity`].
//!
//! Rejected payloads are never surfaced as errors to the patient: the scanner simply keeps
//! waiting for a valid code.

pub mod constants;
mod parser;
mod types;

pub use parser::{inspect_payload, parse_scanned_text};
pub use types::{PayloadRejection, ScannedIdentity};
