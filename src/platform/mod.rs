pub mod browser;
pub mod cancel;
pub mod runtime;
pub mod time;
pub mod token;
