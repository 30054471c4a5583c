pub mod subscribe;

pub use subscribe::{Listener, Listeners, Unsubscribe};
