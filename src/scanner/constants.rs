use std::time::Duration;

pub const QR_CODE_FORMAT: &str = "qr_code";

/// Frame period used where no display refresh signal exists (about 60 Hz).
pub const NATIVE_FRAME_INTERVAL: Duration = Duration::from_millis(16);
