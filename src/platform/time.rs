use chrono::{DateTime, Utc};

/// Current wall-clock time. Browsers read `Date.now()` because `SystemTime` is unavailable
/// on `wasm32-unknown-unknown`.
#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
pub fn now() -> DateTime<Utc> {
    let millis = js_sys::Date::now() as i64;
    DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_default()
}

#[cfg(not(all(target_arch = "wasm32", feature = "wasm-web")))]
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
