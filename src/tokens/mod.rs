//! Issued tokens, expiry evaluation and the countdown shown in the token dialog.

mod countdown;
mod format;
mod history;
mod model;
mod view;

pub use countdown::{Countdown, TickCallback, DEFAULT_COUNTDOWN_TICK};
pub use format::format_remaining;
pub use history::{TokenHistory, DEFAULT_RECENT_LIMIT};
pub use model::{parse_timestamp, IssuedToken};
pub use view::{TokenBoard, TokenView};
