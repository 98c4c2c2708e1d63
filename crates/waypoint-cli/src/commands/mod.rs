pub mod balance;
pub mod config;
pub mod itinerary;
pub mod service;
pub mod utils;
