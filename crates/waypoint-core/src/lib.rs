//! Core domain for the Waypoint trip organizer.
//!
//! Holds the trip model, the pure algorithms behind the organizer
//! (itinerary projection, option ledger, availability cache, pricing,
//! autosave state machine, readiness checks) and the port traits that the
//! interaction layer implements.

pub mod autosave;
pub mod availability;
pub mod config;
pub mod error;
pub mod itinerary;
pub mod navigation;
pub mod pricing;
pub mod readiness;
pub mod selection;
pub mod service_form;
pub mod state;
pub mod trip;
pub mod wallet;

pub use error::{Result, WaypointError};
