//! Wire records exchanged with the profile API
//!
//! JSON uses camelCase keys. Nested items are flat and foreign-keyed to the
//! owning profile. The API is loose about numbers vs strings for ids and years,
//! so those fields go through the `lenient` deserializers.

use serde::{Deserialize, Serialize};

use super::profiles::{ItemId, ProfileId};

/// Profile record as sent and received by the API
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProfile {
    #[serde(default, deserialize_with = "lenient::opt_int")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ProfileId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_year")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founded_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub job_types: Option<Vec<String>>,
    #[serde(default)]
    pub experiences: Option<Vec<WireExperience>>,
    #[serde(default)]
    pub educations: Option<Vec<WireEducation>>,
    #[serde(default)]
    pub schedules: Option<Vec<WireSchedule>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireExperience {
    /// 0 asks the server to create the record
    #[serde(default, deserialize_with = "lenient::item_id")]
    pub id: ItemId,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<ProfileId>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    /// ISO-8601 instant
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEducation {
    #[serde(default, deserialize_with = "lenient::item_id")]
    pub id: ItemId,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<ProfileId>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub start_year: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub end_year: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSchedule {
    #[serde(default, deserialize_with = "lenient::item_id")]
    pub id: ItemId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Int(i64),
        Float(f64),
        Str(String),
    }

    /// Number or numeric string; anything else becomes the creation sentinel.
    pub fn item_id<'de, D>(d: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<NumOrStr>::deserialize(d)? {
            Some(NumOrStr::Int(n)) => n,
            Some(NumOrStr::Float(f)) if f.fract() == 0.0 => f as i64,
            Some(NumOrStr::Str(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        })
    }

    pub fn opt_int<'de, D>(d: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<NumOrStr>::deserialize(d)? {
            Some(NumOrStr::Int(n)) => Some(n),
            Some(NumOrStr::Float(f)) if f.fract() == 0.0 => Some(f as i64),
            Some(NumOrStr::Str(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn opt_year<'de, D>(d: D) -> Result<Option<i32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(opt_int(d)?.and_then(|n| i32::try_from(n).ok()))
    }

    pub fn opt_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<NumOrStr>::deserialize(d)? {
            Some(NumOrStr::Int(n)) => Some(n.to_string()),
            Some(NumOrStr::Float(f)) => Some(f.to_string()),
            Some(NumOrStr::Str(s)) => Some(s),
            None => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_ids_and_years_are_accepted() {
        let wire: WireProfile = serde_json::from_value(json!({
            "id": "7",
            "foundedYear": "2011",
            "educations": [{ "id": "31", "school": "MIT", "startYear": 2014 }],
            "experiences": [{ "id": "draft-1", "company": "Acme" }]
        }))
        .unwrap();

        assert_eq!(wire.id, Some(7));
        assert_eq!(wire.founded_year, Some(2011));
        let edu = &wire.educations.as_ref().unwrap()[0];
        assert_eq!(edu.id, 31);
        assert_eq!(edu.start_year.as_deref(), Some("2014"));
        assert_eq!(wire.experiences.unwrap()[0].id, 0);
    }

    #[test]
    fn null_fields_deserialize_as_absent() {
        let wire: WireProfile =
            serde_json::from_value(json!({ "id": 3, "phone": null, "foundedYear": null })).unwrap();
        assert_eq!(wire.phone, None);
        assert_eq!(wire.founded_year, None);
        assert_eq!(wire.skills, None);
    }

    #[test]
    fn outgoing_items_keep_zero_ids() {
        let exp = WireExperience {
            id: 0,
            profile_id: Some(7),
            company: Some("Acme".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&exp).unwrap();
        assert_eq!(value["id"], json!(0));
        assert_eq!(value["profileId"], json!(7));
    }
}
