//! Scan & Share check-in core for a patient health-record portal.
//!
//! A patient points the camera at a facility counter's QR code. The payload is parsed into a
//! facility/counter identity; if the facility already issued the patient an active queue
//! token it is shown straight away, otherwise the patient consents to sharing their profile
//! and the session polls until the counter issues a new token.
//!
//! - [`scanner`]: camera capture and QR decoding.
//! - [`payload`]: counter payload parser.
//! - [`tokens`]: issued tokens, expiry evaluation, countdown and history.
//! - [`share`]: share/poll state machine and the scan page that drives it.
//! - [`gateway`]: backend capability and its HTTP implementation.
//!
//! Browser bindings (camera, `BarcodeDetector`, geolocation) are behind the `wasm-web`
//! feature.
//!
//! ```
//! use chrono::Utc;
//! use phr_scan_share::payload::parse_scanned_text;
//! use phr_scan_share::tokens::TokenBoard;
//!
//! let identity =
//!     parse_scanned_text("https://phr.example.org/share-profile?hip-id=HF1&counter-id=OPD-2")
//!         .expect("counter payload");
//! let board = TokenBoard::at(&[], Utc::now());
//! assert!(board.active_for_identity(&identity).is_none());
//! ```

pub mod gateway;
pub mod geolocation;
pub mod logger;
pub mod payload;
pub mod platform;
pub mod scanner;
pub mod share;
pub mod tokens;
pub mod util;

#[cfg(all(test, not(target_arch = "wasm32")))]
pub mod test_support;
