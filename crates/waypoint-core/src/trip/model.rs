//! Trip domain model.
//!
//! These types mirror the JSON documents exchanged with the marketplace
//! backend. Unknown fields are preserved in `extra` maps so that a full-trip
//! PATCH does not erase attributes this client does not understand.

use super::location::Location;
use super::media::{Media, MediaSize};
use crate::selection::LineItemKey;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Identifier of a bookable service (`_id` on the wire).
pub type ServiceId = String;

/// Duration of a freshly created trip, in minutes.
pub const DRAFT_TRIP_DURATION: u32 = 1;

/// Text keyed by locale, e.g. `{"en-us": "Weekend in Lisbon"}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    /// Locale used for every text the organizer writes.
    pub const DEFAULT_LOCALE: &'static str = "en-us";

    /// Creates a text with a single entry in the default locale.
    pub fn new(text: impl Into<String>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(Self::DEFAULT_LOCALE.to_string(), text.into());
        Self(entries)
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    /// Resolves the text for display: default locale first, then any locale.
    pub fn translate(&self) -> &str {
        self.get(Self::DEFAULT_LOCALE)
            .or_else(|| self.0.values().next().map(String::as_str))
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|text| text.is_empty())
    }
}

/// A bookable service as referenced from a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(rename = "_id")]
    pub id: ServiceId,
    #[serde(default)]
    pub title: LocalizedText,
    /// Intrinsic price used when no availability option has been chosen
    #[serde(default)]
    pub base_price: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Service {
    pub fn new(id: impl Into<ServiceId>, title: impl Into<String>, base_price: f64) -> Self {
        Self {
            id: id.into(),
            title: LocalizedText::new(title),
            base_price,
            extra: Map::new(),
        }
    }
}

/// A (day, service) pairing inside a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAssignment {
    /// One-based day number
    pub day: u32,
    pub service: Service,
    #[serde(default = "default_priority")]
    pub priority: u32,
    #[serde(default)]
    pub notes: Vec<Value>,
}

fn default_priority() -> u32 {
    1
}

impl DayAssignment {
    pub fn new(day: u32, service: Service) -> Self {
        Self {
            day,
            service,
            priority: default_priority(),
            notes: Vec::new(),
        }
    }

    pub fn key(&self) -> LineItemKey {
        LineItemKey::new(self.day, self.service.id.clone())
    }
}

/// A trip tag. Loaded as a full object, persisted as its bare identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub names: LocalizedText,
}

impl Serialize for Tag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.id)
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum TagRepr {
            Id(String),
            Full {
                #[serde(rename = "_id")]
                id: String,
                #[serde(default)]
                names: LocalizedText,
            },
        }

        Ok(match TagRepr::deserialize(deserializer)? {
            TagRepr::Id(id) => Tag {
                id,
                names: LocalizedText::default(),
            },
            TagRepr::Full { id, names } => Tag { id, names },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Public,
    Private,
    Unlisted,
}

/// One flattened entry of the option selection ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedServiceOption {
    pub day: u32,
    pub service_id: ServiceId,
    pub availability_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherAttributes {
    #[serde(default)]
    pub selected_service_options: Vec<SelectedServiceOption>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The aggregate being edited: metadata plus service assignments across days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    /// Backend identifier; `None` until the backend has created the trip
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: LocalizedText,
    /// Flat list of day assignments
    #[serde(default)]
    pub services: Vec<DayAssignment>,
    #[serde(default)]
    pub media: Vec<Media>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: Location,
    #[serde(default)]
    pub base_price: f64,
    /// Trip length in minutes (days × 1440)
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy: Option<Privacy>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_date::deserialize"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people_count: Option<u32>,
    #[serde(default)]
    pub other_attributes: OtherAttributes,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_duration() -> u32 {
    DRAFT_TRIP_DURATION
}

impl Trip {
    /// The empty template used when the organizer opens a trip that has not
    /// been loaded from the backend.
    pub fn draft() -> Self {
        Self {
            id: None,
            title: LocalizedText::default(),
            services: Vec::new(),
            media: Vec::new(),
            location: Location::default(),
            base_price: 0.0,
            duration: DRAFT_TRIP_DURATION,
            tags: Vec::new(),
            privacy: None,
            start_date: None,
            people_count: None,
            other_attributes: OtherAttributes::default(),
            extra: Map::new(),
        }
    }

    /// URL of the cover image: the hero media's hero rendition, falling back
    /// to the large rendition of the first media item.
    pub fn hero_image_url(&self) -> Option<&str> {
        let hero = self
            .media
            .iter()
            .find(|media| media.hero)
            .or_else(|| self.media.first())?;

        hero.files
            .get(MediaSize::Hero)
            .or_else(|| hero.files.get(MediaSize::Large))
            .map(|file| file.url.as_str())
    }
}

/// Accepts either `YYYY-MM-DD` or a full RFC 3339 timestamp for dates.
mod lenient_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer};

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let date_part = raw.get(..10).unwrap_or(&raw);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trip_deserializes_backend_document() {
        let trip: Trip = serde_json::from_value(json!({
            "_id": "trip-1",
            "title": { "en-us": "Lisbon" },
            "services": [
                { "day": 1, "priority": 2, "notes": [], "service": { "_id": "svc-a", "basePrice": 100 } }
            ],
            "duration": 2880,
            "tags": [{ "_id": "tag-1", "names": { "en-us": "Food" } }, "tag-2"],
            "startDate": "2018-06-01T00:00:00.000Z",
            "owner": "user-9"
        }))
        .unwrap();

        assert_eq!(trip.id.as_deref(), Some("trip-1"));
        assert_eq!(trip.title.translate(), "Lisbon");
        assert_eq!(trip.services[0].priority, 2);
        assert_eq!(trip.services[0].service.base_price, 100.0);
        assert_eq!(trip.tags[0].names.translate(), "Food");
        assert_eq!(trip.tags[1].id, "tag-2");
        assert_eq!(trip.start_date, NaiveDate::from_ymd_opt(2018, 6, 1));
        assert_eq!(trip.extra.get("owner"), Some(&json!("user-9")));
    }

    #[test]
    fn test_tags_serialize_as_identifiers() {
        let mut trip = Trip::draft();
        trip.tags = vec![Tag {
            id: "tag-1".into(),
            names: LocalizedText::new("Food"),
        }];

        let value = serde_json::to_value(&trip).unwrap();
        assert_eq!(value["tags"], json!(["tag-1"]));
        assert!(value.get("_id").is_none());
    }

    #[test]
    fn test_draft_trip_has_single_minute_duration() {
        let trip = Trip::draft();
        assert_eq!(trip.duration, 1);
        assert!(trip.title.is_empty());
        assert!(trip.services.is_empty());
        assert_eq!(trip.base_price, 0.0);
    }

    #[test]
    fn test_localized_text_falls_back_to_any_locale() {
        let text: LocalizedText = serde_json::from_value(json!({ "fr-fr": "Bonjour" })).unwrap();
        assert_eq!(text.translate(), "Bonjour");
        assert_eq!(LocalizedText::default().translate(), "");
    }
}
