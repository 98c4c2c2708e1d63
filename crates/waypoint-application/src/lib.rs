//! Application layer for Waypoint.
//!
//! Coordinates the trip state held in the core crate with the remote
//! services of the interaction crate, and runs the autosave scheduler.

pub mod autosave_scheduler;
pub mod services;
pub mod trip_organizer;

pub use autosave_scheduler::AutosaveScheduler;
pub use services::OrganizerServices;
pub use trip_organizer::{PendingCheck, SaveOutcome, TripOrganizer};
