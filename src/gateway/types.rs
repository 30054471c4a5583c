use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::geolocation::Coordinates;
use crate::payload::ScannedIdentity;

/// Body of the profile-share call that notifies a facility counter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShareRequest {
    #[serde(rename = "hip_id")]
    pub facility_id: String,
    /// Counter id; the backend calls this field `context`.
    #[serde(rename = "context")]
    pub counter_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hpr_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl ShareRequest {
    pub fn new(identity: &ScannedIdentity, coordinates: Option<Coordinates>) -> Self {
        Self {
            facility_id: identity.facility_id().to_owned(),
            counter_id: identity.counter_id().to_owned(),
            hpr_id: None,
            latitude: coordinates.map(|c| c.latitude),
            longitude: coordinates.map(|c| c.longitude),
        }
    }
}

/// Opaque acknowledgement returned by a successful share.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareAck(pub JsonValue);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderIdentifier {
    pub name: String,
    pub id: String,
}

/// Facility directory entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub identifier: ProviderIdentifier,
    #[serde(default)]
    pub facility_type: Vec<String>,
    #[serde(default)]
    pub is_govt_entity: bool,
}
