use url::Url;

use crate::payload::constants::{COUNTER_ID_KEYS, FACILITY_ID_KEYS, SHARE_PROFILE_ROUTE};
use crate::payload::types::{PayloadRejection, ScannedIdentity};

/// Extracts the facility/counter identity from a decoded QR string.
///
/// Returns `None` for anything that is not an absolute URL on the `/share-profile` route
/// carrying both ids. Never panics.
///
/// # Examples
///
/// ```
/// use phr_scan_share::payload::parse_scanned_text;
///
/// let identity = parse_scanned_text("https://phr.example.org/share-profile?hip-id=HF1&counter_id=C7")
///     .expect("valid payload");
/// assert_eq!(identity.facility_id(), "HF1");
/// assert_eq!(identity.counter_id(), "C7");
///
/// assert!(parse_scanned_text("not a url").is_none());
/// ```
pub fn parse_scanned_text(text: &str) -> Option<ScannedIdentity> {
    inspect_payload(text).ok()
}

/// Same decision as [`parse_scanned_text`], keeping the rejection reason for diagnostics.
pub fn inspect_payload(text: &str) -> Result<ScannedIdentity, PayloadRejection> {
    let url = Url::parse(text).map_err(|_| PayloadRejection::NotAUrl)?;
    if url.path() != SHARE_PROFILE_ROUTE {
        return Err(PayloadRejection::UnexpectedRoute);
    }

    let facility_id = first_present(&url, &FACILITY_ID_KEYS).ok_or(PayloadRejection::MissingFacility)?;
    let counter_id = first_present(&url, &COUNTER_ID_KEYS).ok_or(PayloadRejection::MissingCounter)?;

    Ok(ScannedIdentity::new(facility_id, counter_id))
}

// The first spelling that appears wins even when its value is empty, so `hip-id=&hip_id=X`
// is rejected rather than silently falling back.
fn first_present(url: &Url, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| query_value(url, key))
        .filter(|value| !value.is_empty())
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}
