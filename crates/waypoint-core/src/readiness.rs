//! Checks that gate the explicit share and book actions.

use crate::availability::AvailabilityRecord;
use crate::selection::SelectionLedger;
use crate::trip::Trip;
use chrono::NaiveDate;
use thiserror::Error;

/// Why a trip cannot be booked yet. Messages are shown to the traveller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookBlocker {
    #[error("You need to select a start date")]
    MissingStartDate,
    #[error("You need to select a number of guests")]
    MissingGuests,
    #[error("Please check that all services are available in selected dates")]
    UnavailableServices,
    #[error("You must select the options for each service to book")]
    MissingOptions,
}

/// Why a trip cannot be shared yet.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareBlocker {
    #[error("You need to add a location")]
    MissingLocation,
    #[error("You need to add an image")]
    MissingImage,
}

/// First reason the trip cannot be booked, if any.
///
/// Records whose check failed count as unavailable.
pub fn book_blocker(
    start_date: Option<NaiveDate>,
    people_count: Option<u32>,
    availability: &[AvailabilityRecord],
    ledger: &SelectionLedger,
) -> Option<BookBlocker> {
    if start_date.is_none() {
        return Some(BookBlocker::MissingStartDate);
    }
    if people_count.is_none_or(|count| count == 0) {
        return Some(BookBlocker::MissingGuests);
    }
    if !availability.iter().all(AvailabilityRecord::is_available) {
        return Some(BookBlocker::UnavailableServices);
    }
    let missing_option = availability
        .iter()
        .any(|record| record.has_options() && !ledger.contains(&record.key));
    if missing_option {
        return Some(BookBlocker::MissingOptions);
    }
    None
}

/// First reason the trip cannot be shared, if any.
pub fn share_blocker(trip: &Trip) -> Option<ShareBlocker> {
    if trip.location.is_empty() {
        return Some(ShareBlocker::MissingLocation);
    }
    if trip.media.is_empty() {
        return Some(ShareBlocker::MissingImage);
    }
    None
}
