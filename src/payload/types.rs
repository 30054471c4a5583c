use std::fmt;

use serde::Serialize;
use url::Url;

use crate::payload::constants::{COUNTER_ID_KEYS, FACILITY_ID_KEYS, SHARE_PROFILE_ROUTE};

/// Facility + counter pair decoded from a counter QR code.
///
/// Only [`parse_scanned_text`](crate::payload::parse_scanned_text) constructs one, so both
/// fields are guaranteed non-empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ScannedIdentity {
    facility_id: String,
    counter_id: String,
}

impl ScannedIdentity {
    pub(crate) fn new(facility_id: String, counter_id: String) -> Self {
        debug_assert!(!facility_id.is_empty() && !counter_id.is_empty());
        Self {
            facility_id,
            counter_id,
        }
    }

    pub fn facility_id(&self) -> &str {
        &self.facility_id
    }

    pub fn counter_id(&self) -> &str {
        &self.counter_id
    }

    /// Builds the payload a counter display would encode for this identity, on `base`'s origin.
    pub fn to_payload_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        url.set_path(SHARE_PROFILE_ROUTE);
        url.set_fragment(None);
        url.query_pairs_mut()
            .clear()
            .append_pair(FACILITY_ID_KEYS[0], &self.facility_id)
            .append_pair(COUNTER_ID_KEYS[0], &self.counter_id);
        url
    }
}

impl fmt::Display for ScannedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / counter {}", self.facility_id, self.counter_id)
    }
}

/// Why a decoded string was not accepted as a counter payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadRejection {
    NotAUrl,
    UnexpectedRoute,
    MissingFacility,
    MissingCounter,
}

impl PayloadRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadRejection::NotAUrl => "payload/not-a-url",
            PayloadRejection::UnexpectedRoute => "payload/unexpected-route",
            PayloadRejection::MissingFacility => "payload/missing-facility",
            PayloadRejection::MissingCounter => "payload/missing-counter",
        }
    }
}

impl fmt::Display for PayloadRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            PayloadRejection::NotAUrl => "scanned text is not an absolute URL",
            PayloadRejection::UnexpectedRoute => "scanned URL does not point at the share route",
            PayloadRejection::MissingFacility => "scanned URL has no facility id",
            PayloadRejection::MissingCounter => "scanned URL has no counter id",
        };
        write!(f, "{message} ({})", self.as_str())
    }
}
