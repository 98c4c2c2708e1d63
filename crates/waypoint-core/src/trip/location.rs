//! Trip location and place geocoding.

use crate::error::{Result, WaypointError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A GeoJSON point. Coordinates are `[lng, lat]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [lng, lat],
        }
    }

    pub fn lat(&self) -> f64 {
        self.coordinates[1]
    }

    pub fn lng(&self) -> f64 {
        self.coordinates[0]
    }
}

/// Where a trip takes place. Every field is optional on the wire; the draft
/// template carries an empty object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoPoint>,
}

impl Location {
    /// Builds a location from geocoded place details.
    ///
    /// The city is the first `locality` or `postal_town` component, the state
    /// the first `administrative_area_level_1`, the country code the short
    /// name of the first `country`. A place missing any of them cannot be
    /// used as a trip location.
    pub fn from_place(details: &PlaceDetails) -> Result<Self> {
        let city = details
            .component_with_any(&["locality", "postal_town"])
            .map(|c| c.long_name.clone())
            .ok_or_else(|| WaypointError::validation("place has no locality"))?;
        let state = details
            .component_with_any(&["administrative_area_level_1"])
            .map(|c| c.long_name.clone())
            .ok_or_else(|| WaypointError::validation("place has no administrative area"))?;
        let country_code = details
            .component_with_any(&["country"])
            .map(|c| c.short_name.clone())
            .ok_or_else(|| WaypointError::validation("place has no country"))?;

        Ok(Self {
            city: Some(city),
            state: Some(state),
            country_code: Some(country_code),
            geo: Some(GeoPoint::new(details.lat, details.lng)),
        })
    }

    /// A location counts as set once it names a city or a state.
    pub fn is_empty(&self) -> bool {
        self.city.as_deref().is_none_or(str::is_empty)
            && self.state.as_deref().is_none_or(str::is_empty)
    }

    /// Formats the location as shown in the organizer: `City, State, CC`.
    /// Without a city nothing is shown.
    pub fn display(&self) -> String {
        let Some(city) = self.city.as_deref() else {
            return String::new();
        };
        let mut result = city.to_string();
        if let Some(state) = self.state.as_deref() {
            result.push_str(", ");
            result.push_str(state);
        }
        if let Some(country_code) = self.country_code.as_deref() {
            result.push_str(", ");
            result.push_str(country_code);
        }
        result
    }

    /// Formats the location as shown on trip cards: `City, State`, or the
    /// state alone when no city is known.
    pub fn card_label(&self) -> Option<String> {
        match (self.city.as_deref(), self.state.as_deref()) {
            (Some(city), Some(state)) => Some(format!("{city}, {state}")),
            (Some(city), None) => Some(city.to_string()),
            (None, state) => state.map(str::to_string),
        }
    }
}

/// One component of a geocoded address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Geocoding result for a place identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub address_components: Vec<AddressComponent>,
    pub lat: f64,
    pub lng: f64,
}

impl PlaceDetails {
    fn component_with_any(&self, types: &[&str]) -> Option<&AddressComponent> {
        self.address_components
            .iter()
            .find(|component| component.types.iter().any(|t| types.contains(&t.as_str())))
    }
}

/// Resolves place identifiers (from an address autocomplete) to details.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Looks up a place by its identifier.
    ///
    /// # Errors
    ///
    /// Returns `WaypointError::Remote` when the lookup fails or yields no result.
    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(long: &str, short: &str, types: &[&str]) -> AddressComponent {
        AddressComponent {
            long_name: long.into(),
            short_name: short.into(),
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn lisbon() -> PlaceDetails {
        PlaceDetails {
            address_components: vec![
                component("Lisbon", "Lisbon", &["locality", "political"]),
                component("Lisbon District", "Lisbon", &["administrative_area_level_1"]),
                component("Portugal", "PT", &["country", "political"]),
            ],
            lat: 38.72,
            lng: -9.14,
        }
    }

    #[test]
    fn test_location_from_place_details() {
        let location = Location::from_place(&lisbon()).unwrap();

        assert_eq!(location.city.as_deref(), Some("Lisbon"));
        assert_eq!(location.state.as_deref(), Some("Lisbon District"));
        assert_eq!(location.country_code.as_deref(), Some("PT"));
        let geo = location.geo.unwrap();
        assert_eq!(geo.coordinates, [-9.14, 38.72]);
        assert_eq!(geo.kind, "Point");
    }

    #[test]
    fn test_postal_town_counts_as_city() {
        let details = PlaceDetails {
            address_components: vec![
                component("Bath", "Bath", &["postal_town"]),
                component("England", "England", &["administrative_area_level_1"]),
                component("United Kingdom", "GB", &["country"]),
            ],
            lat: 51.38,
            lng: -2.36,
        };

        assert_eq!(
            Location::from_place(&details).unwrap().city.as_deref(),
            Some("Bath")
        );
    }

    #[test]
    fn test_place_without_country_is_rejected() {
        let mut details = lisbon();
        details.address_components.pop();

        assert!(Location::from_place(&details).unwrap_err().is_validation());
    }

    #[test]
    fn test_display_formats() {
        let location = Location::from_place(&lisbon()).unwrap();
        assert_eq!(location.display(), "Lisbon, Lisbon District, PT");
        assert_eq!(
            location.card_label().as_deref(),
            Some("Lisbon, Lisbon District")
        );

        let state_only = Location {
            state: Some("Bavaria".into()),
            ..Location::default()
        };
        assert_eq!(state_only.display(), "");
        assert_eq!(state_only.card_label().as_deref(), Some("Bavaria"));
        assert!(!state_only.is_empty());
        assert!(Location::default().is_empty());
    }
}
