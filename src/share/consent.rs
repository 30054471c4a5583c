use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

use crate::payload::ScannedIdentity;

/// Demographics of the signed-in patient, as served by the profile endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    #[serde(default)]
    pub abha_number: Option<String>,
    #[serde(default)]
    pub abha_address: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub day_of_birth: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub month_of_birth: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub year_of_birth: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl PatientProfile {
    /// Full date of birth when known, otherwise `day-month-year` with placeholders.
    pub fn birth_date_label(&self) -> String {
        if let Some(date) = &self.date_of_birth {
            return date.clone();
        }
        format!(
            "{}-{}-{}",
            self.day_of_birth.as_deref().unwrap_or("--"),
            self.month_of_birth.as_deref().unwrap_or("--"),
            self.year_of_birth.as_deref().unwrap_or("----"),
        )
    }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(text)) => Ok(Some(text)),
        Some(JsonValue::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsentRow {
    pub label: &'static str,
    pub value: String,
}

/// What the patient is asked to share, in display order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsentSummary {
    pub facility_id: String,
    pub rows: Vec<ConsentRow>,
}

impl ConsentSummary {
    pub fn new(identity: &ScannedIdentity, profile: &PatientProfile) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let rows = vec![
            ConsentRow {
                label: "ABHA Number",
                value: profile.abha_number.clone().unwrap_or_else(|| "-".to_string()),
            },
            ConsentRow {
                label: "ABHA Address",
                value: text(&profile.abha_address),
            },
            ConsentRow {
                label: "Name",
                value: text(&profile.full_name),
            },
            ConsentRow {
                label: "Gender",
                value: text(&profile.gender),
            },
            ConsentRow {
                label: "Date Of Birth",
                value: profile.birth_date_label(),
            },
            ConsentRow {
                label: "Mobile",
                value: text(&profile.mobile),
            },
            ConsentRow {
                label: "Address",
                value: text(&profile.address),
            },
        ];
        Self {
            facility_id: identity.facility_id().to_owned(),
            rows,
        }
    }

    pub fn headline(&self) -> String {
        format!("Share your details with {}", self.facility_id)
    }

    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::parse_scanned_text;
    use serde_json::json;

    fn identity() -> ScannedIdentity {
        parse_scanned_text("https://phr.example.org/share-profile?hip_id=HF7&counter_id=C1").unwrap()
    }

    #[test]
    fn fills_placeholders_for_missing_fields() {
        let profile: PatientProfile = serde_json::from_value(json!({
            "abhaAddress": "asha@abdm",
            "fullName": "Asha Rao",
            "dayOfBirth": 4,
            "yearOfBirth": "1990"
        }))
        .unwrap();
        let summary = ConsentSummary::new(&identity(), &profile);

        assert_eq!(summary.headline(), "Share your details with HF7");
        assert_eq!(summary.value("ABHA Number"), Some("-"));
        assert_eq!(summary.value("Name"), Some("Asha Rao"));
        assert_eq!(summary.value("Date Of Birth"), Some("4----1990"));
        assert_eq!(summary.value("Mobile"), Some(""));
        assert_eq!(summary.rows.len(), 7);
    }

    #[test]
    fn prefers_full_date_of_birth() {
        let profile = PatientProfile {
            date_of_birth: Some("1990-01-04".into()),
            month_of_birth: Some("1".into()),
            ..Default::default()
        };
        assert_eq!(profile.birth_date_label(), "1990-01-04");
        assert_eq!(PatientProfile::default().birth_date_label(), "----------");
    }
}
