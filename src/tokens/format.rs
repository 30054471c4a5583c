/// Formats a countdown for display.
///
/// Inactive tokens render as `"Expired"`. Otherwise the two most significant units are
/// shown: `"1h 2m"` from one hour up, `"2m 5s"` from one minute up, else `"9s"`.
pub fn format_remaining(remaining_seconds: i64, is_active: bool) -> String {
    if !is_active {
        return "Expired".to_string();
    }

    let remaining = remaining_seconds.max(0);
    let hours = remaining / 3600;
    let minutes = (remaining % 3600) / 60;
    let seconds = remaining % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
