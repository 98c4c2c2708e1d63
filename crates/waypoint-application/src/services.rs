//! Remote collaborators of the organizer.

use std::sync::Arc;
use waypoint_core::availability::AvailabilityService;
use waypoint_core::config::WaypointConfig;
use waypoint_core::navigation::{Navigator, NoOpNavigator};
use waypoint_core::trip::{Geocoder, MediaRepository, TripRepository};
use waypoint_interaction::{MarketplaceApiClient, PlacesGeocoder};

#[derive(Clone)]
pub struct OrganizerServices {
    pub trips: Arc<dyn TripRepository>,
    pub media: Arc<dyn MediaRepository>,
    pub availability: Arc<dyn AvailabilityService>,
    pub geocoder: Arc<dyn Geocoder>,
    pub navigator: Arc<dyn Navigator>,
}

impl OrganizerServices {
    /// Wires the HTTP clients described by `config`. Navigation is a no-op;
    /// front ends set their own `navigator`.
    pub fn http(config: &WaypointConfig) -> Self {
        let api = Arc::new(MarketplaceApiClient::from_config(&config.api));
        Self {
            trips: api.clone(),
            media: api.clone(),
            availability: api,
            geocoder: Arc::new(PlacesGeocoder::from_config(&config.places)),
            navigator: Arc::new(NoOpNavigator),
        }
    }
}
