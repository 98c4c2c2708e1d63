//! Place details lookup backed by the Google Places web service.

use crate::http::{ensure_success, read_json, transport_error};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use waypoint_core::config::PlacesConfig;
use waypoint_core::trip::{AddressComponent, Geocoder, PlaceDetails};
use waypoint_core::{Result, WaypointError};

const OPERATION: &str = "geocode place";
const FIELDS: &str = "address_components,geometry";

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

fn into_place_details(place_id: &str, response: PlacesResponse) -> Result<PlaceDetails> {
    if response.status != "OK" {
        let message = response
            .error_message
            .unwrap_or_else(|| format!("lookup returned {}", response.status));
        return Err(WaypointError::remote(OPERATION, message));
    }

    let result = response
        .result
        .ok_or_else(|| WaypointError::not_found("place", place_id))?;
    Ok(PlaceDetails {
        address_components: result.address_components,
        lat: result.geometry.location.lat,
        lng: result.geometry.location.lng,
    })
}

#[derive(Clone)]
pub struct PlacesGeocoder {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl PlacesGeocoder {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_config(config: &PlacesConfig) -> Self {
        Self::new(config.base_url.clone(), config.api_key.clone())
    }

    fn details_request(&self, place_id: &str) -> Result<reqwest::RequestBuilder> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| WaypointError::config("places api_key is not configured"))?;

        Ok(self
            .client
            .get(format!("{}/place/details/json", self.base_url))
            .query(&[("place_id", place_id), ("fields", FIELDS), ("key", api_key)])
            .timeout(self.timeout))
    }
}

#[async_trait]
impl Geocoder for PlacesGeocoder {
    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails> {
        tracing::debug!("[PlacesGeocoder] Looking up place {}", place_id);

        let response = self
            .details_request(place_id)?
            .send()
            .await
            .map_err(|e| transport_error(OPERATION, e))?;
        let response = ensure_success(OPERATION, response).await?;
        let body: PlacesResponse = read_json(OPERATION, response).await?;
        into_place_details(place_id, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_request_url() {
        let geocoder = PlacesGeocoder::new("https://maps.example.com/api/", Some("k1".into()));
        let request = geocoder.details_request("ChIJ123").unwrap().build().unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://maps.example.com/api/place/details/json?place_id=ChIJ123&fields=address_components%2Cgeometry&key=k1"
        );
    }

    #[test]
    fn test_missing_api_key_is_a_config_error() {
        let geocoder = PlacesGeocoder::new("https://maps.example.com/api", None);
        assert!(matches!(
            geocoder.details_request("x"),
            Err(WaypointError::Config(_))
        ));
    }

    #[test]
    fn test_ok_response_converts_to_details() {
        let response: PlacesResponse = serde_json::from_value(serde_json::json!({
            "status": "OK",
            "result": {
                "address_components": [
                    { "long_name": "Kyoto", "short_name": "Kyoto", "types": ["locality"] }
                ],
                "geometry": { "location": { "lat": 35.01, "lng": 135.77 } }
            }
        }))
        .unwrap();

        let details = into_place_details("p1", response).unwrap();
        assert_eq!(details.address_components[0].long_name, "Kyoto");
        assert_eq!((details.lat, details.lng), (35.01, 135.77));
    }

    #[test]
    fn test_error_status_is_a_remote_error() {
        let response: PlacesResponse = serde_json::from_value(serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        }))
        .unwrap();

        let err = into_place_details("p1", response).unwrap_err();
        assert!(err.is_remote());
        assert!(err.to_string().contains("API key is invalid"));
    }
}
