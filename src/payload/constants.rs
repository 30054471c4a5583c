/// Route every counter QR code points at.
pub const SHARE_PROFILE_ROUTE: &str = "/share-profile";

pub const FACILITY_ID_KEYS: [&str; 2] = ["hip-id", "hip_id"];
pub const COUNTER_ID_KEYS: [&str; 2] = ["counter-id", "counter_id"];
