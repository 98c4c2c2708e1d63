//! Interaction layer: HTTP clients for the services the organizer talks to.

pub mod etherscan;
pub mod http;
pub mod marketplace_api;
pub mod places_geocoder;

pub use etherscan::EtherscanClient;
pub use marketplace_api::MarketplaceApiClient;
pub use places_geocoder::PlacesGeocoder;
