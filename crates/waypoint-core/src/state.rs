//! Owned state of the trip being edited.
//!
//! `TripState` applies every organizer mutation synchronously and derives the
//! PATCH body sent to the backend. It performs no I/O; the application layer
//! issues remote calls and feeds their results back in.

use crate::autosave::SaveAction;
use crate::availability::{
    AvailabilityCache, AvailabilityQuery, AvailabilityRecord, AvailabilityResponse,
    DiscardReason, Generation, WriteOutcome,
};
use crate::error::{Result, WaypointError};
use crate::itinerary::{self, Day, DaysByService};
use crate::pricing;
use crate::readiness::{self, BookBlocker, ShareBlocker};
use crate::selection::{LineItemKey, OptionSelection, SelectionLedger};
use crate::trip::{DayAssignment, LocalizedText, Location, Media, Privacy, Service, ServiceId, Trip};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Dates and guests currently chosen in the organizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BookingParams {
    pub start_date: Option<NaiveDate>,
    pub people_count: Option<u32>,
}

/// Visible progress of an explicit share or book.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaveStatus {
    pub is_saving: bool,
    pub last_error: Option<String>,
}

/// One availability request of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityRequest {
    pub key: LineItemKey,
    pub query: AvailabilityQuery,
}

/// Requests issued together under one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityBatch {
    pub generation: Generation,
    pub requests: Vec<AvailabilityRequest>,
}

#[derive(Debug, Clone)]
pub struct TripState {
    trip: Trip,
    days: Vec<Day>,
    ledger: SelectionLedger,
    availability: AvailabilityCache,
    days_by_service: DaysByService,
    booking: BookingParams,
    save_status: SaveStatus,
}

impl TripState {
    /// Builds the editing state from a trip loaded from the backend.
    pub fn from_trip(trip: Trip) -> Self {
        let days = itinerary::project(&trip.services, trip.duration, trip.start_date);
        let ledger =
            SelectionLedger::from_selected_options(&trip.other_attributes.selected_service_options);
        let days_by_service = DaysByService::from_days(&days);
        let booking = BookingParams {
            start_date: trip.start_date,
            people_count: trip.people_count,
        };

        Self {
            trip,
            days,
            ledger,
            availability: AvailabilityCache::new(),
            days_by_service,
            booking,
            save_status: SaveStatus::default(),
        }
    }

    /// State for a trip that has not been created yet. It has no days until
    /// the first one is added.
    pub fn draft() -> Self {
        let mut state = Self::from_trip(Trip::draft());
        state.days.clear();
        state
    }

    pub fn trip(&self) -> &Trip {
        &self.trip
    }

    pub fn trip_id(&self) -> Option<&str> {
        self.trip.id.as_deref()
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn ledger(&self) -> &SelectionLedger {
        &self.ledger
    }

    pub fn availability(&self) -> &AvailabilityCache {
        &self.availability
    }

    pub fn days_by_service(&self) -> &DaysByService {
        &self.days_by_service
    }

    pub fn booking(&self) -> BookingParams {
        self.booking
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }

    pub fn base_price(&self) -> f64 {
        self.trip.base_price
    }

    /// Every (day, service) pair of the itinerary, in display order.
    pub fn line_items(&self) -> Vec<LineItemKey> {
        self.days
            .iter()
            .flat_map(|day| day.data.iter().map(|assignment| assignment.key()))
            .collect()
    }

    fn has_line_item(&self, key: &LineItemKey) -> bool {
        self.days
            .iter()
            .any(|day| day.day == key.day && day.contains_service(&key.service_id))
    }

    fn recompute_price(&mut self) {
        self.trip.base_price =
            pricing::base_price(self.availability.records(), &self.ledger, &self.days);
    }

    // ============================================================================
    // Itinerary mutations
    // ============================================================================

    /// Appends a service to a day.
    ///
    /// # Errors
    ///
    /// Returns `WaypointError::NotFound` when the day is not in the itinerary.
    pub fn add_service(&mut self, day: u32, service: Service) -> Result<LineItemKey> {
        let target = self
            .days
            .iter_mut()
            .find(|d| d.day == day)
            .ok_or_else(|| WaypointError::not_found("day", day.to_string()))?;

        let assignment = DayAssignment::new(day, service);
        let key = assignment.key();
        target.data.push(assignment);
        self.days_by_service.insert(&key.service_id, day);
        self.recompute_price();
        Ok(key)
    }

    /// Removes a service from a day, together with its selection and
    /// availability.
    pub fn remove_service(&mut self, day: u32, service_id: &str) -> Result<()> {
        let target = self
            .days
            .iter_mut()
            .find(|d| d.day == day)
            .ok_or_else(|| WaypointError::not_found("day", day.to_string()))?;

        let before = target.data.len();
        target.data.retain(|assignment| assignment.service.id != service_id);
        if target.data.len() == before {
            return Err(WaypointError::not_found(
                "line item",
                LineItemKey::new(day, service_id).to_string(),
            ));
        }

        let key = LineItemKey::new(day, service_id);
        self.ledger.remove(&key);
        self.availability.remove(&key);
        self.days_by_service.remove(service_id, day);
        self.recompute_price();
        Ok(())
    }

    /// Records the option chosen for a line item and reprices the trip.
    pub fn select_option(
        &mut self,
        day: u32,
        service_id: impl Into<ServiceId>,
        availability_code: impl Into<String>,
        price: Option<f64>,
    ) {
        self.ledger.select(
            LineItemKey::new(day, service_id),
            OptionSelection::new(availability_code, price),
        );
        self.recompute_price();
    }

    /// Appends the day after the last one, or day 1 on an empty itinerary.
    pub fn add_day(&mut self) -> u32 {
        let next = self.days.last().map_or(1, |last| last.day + 1);
        self.days.push(Day::empty(next, self.booking.start_date));
        self.trip.duration = itinerary::days_to_minutes(self.days.len() as u32);
        next
    }

    // ============================================================================
    // Trip metadata
    // ============================================================================

    pub fn rename(&mut self, title: impl Into<String>) {
        self.trip.title = LocalizedText::new(title);
    }

    pub fn set_start_date(&mut self, start_date: Option<NaiveDate>) {
        self.booking.start_date = start_date;
        for day in &mut self.days {
            day.date = start_date.and_then(|start| itinerary::date_for_day(start, day.day));
        }
    }

    pub fn set_people_count(&mut self, people_count: Option<u32>) {
        self.booking.people_count = people_count;
    }

    pub fn set_location(&mut self, location: Location) {
        self.trip.location = location;
    }

    /// Replaces the trip media with a single cover image.
    pub fn set_cover(&mut self, url: &str) {
        self.trip.media = vec![Media::trip_cover(url)];
    }

    // ============================================================================
    // Availability
    // ============================================================================

    /// Stamps a new availability generation and lists one request per line
    /// item.
    pub fn begin_availability_batch(
        &mut self,
        start_date: NaiveDate,
        people_count: Option<u32>,
    ) -> Result<AvailabilityBatch> {
        let requests = self
            .line_items()
            .into_iter()
            .map(|key| {
                AvailabilityQuery::for_line_item(start_date, key.day, people_count)
                    .map(|query| AvailabilityRequest { key, query })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(AvailabilityBatch {
            generation: self.availability.begin_batch(),
            requests,
        })
    }

    /// Applies the outcomes of a batch, paired with their requests by index.
    ///
    /// Line items removed while the batch was in flight are skipped.
    pub fn apply_availability_batch(
        &mut self,
        generation: Generation,
        outcomes: Vec<(LineItemKey, Result<AvailabilityResponse>)>,
    ) -> WriteOutcome {
        let current: HashSet<LineItemKey> = self.line_items().into_iter().collect();
        let records = outcomes
            .into_iter()
            .filter(|(key, _)| current.contains(key))
            .map(|(key, outcome)| AvailabilityRecord::from_outcome(key, generation, &outcome))
            .collect();

        let outcome = self.availability.apply_batch(generation, records);
        if outcome.is_applied() {
            self.availability.retain_keys(&current);
            self.recompute_price();
        }
        outcome
    }

    /// Request for a single line item under the current generation, when a
    /// start date is known.
    pub fn line_item_check(&self, key: &LineItemKey) -> Option<(Generation, AvailabilityRequest)> {
        let start_date = self.booking.start_date?;
        let query =
            AvailabilityQuery::for_line_item(start_date, key.day, self.booking.people_count).ok()?;
        Some((
            self.availability.generation(),
            AvailabilityRequest {
                key: key.clone(),
                query,
            },
        ))
    }

    /// Appends the outcome of a single line item check.
    pub fn apply_availability_record(
        &mut self,
        generation: Generation,
        key: LineItemKey,
        outcome: Result<AvailabilityResponse>,
    ) -> WriteOutcome {
        if !self.has_line_item(&key) {
            return WriteOutcome::Discarded {
                reason: DiscardReason::Removed { key },
            };
        }

        let outcome = self
            .availability
            .append(AvailabilityRecord::from_outcome(key, generation, &outcome));
        if outcome.is_applied() {
            self.recompute_price();
        }
        outcome
    }

    // ============================================================================
    // Saving
    // ============================================================================

    /// Snapshot of the trip as sent in `PATCH /trips/{id}`.
    pub fn to_patch_body(&self, action: SaveAction) -> Trip {
        let mut body = self.trip.clone();
        body.services = itinerary::flatten(&self.days);
        body.other_attributes.selected_service_options = self.ledger.to_selected_options();
        body.duration = itinerary::days_to_minutes(self.days.len() as u32).max(1);
        body.start_date = self.booking.start_date;
        body.people_count = self.booking.people_count;
        if action == SaveAction::Share {
            body.privacy = Some(Privacy::Public);
        }
        body
    }

    pub fn begin_explicit_save(&mut self) {
        self.save_status.is_saving = true;
        self.save_status.last_error = None;
    }

    pub fn finish_explicit_save(&mut self, error: Option<String>) {
        self.save_status.is_saving = false;
        self.save_status.last_error = error;
    }

    /// Marks the trip as shared once the backend accepted it.
    pub fn mark_public(&mut self) {
        self.trip.privacy = Some(Privacy::Public);
    }

    // ============================================================================
    // Readiness
    // ============================================================================

    pub fn book_blocker(&self) -> Option<BookBlocker> {
        readiness::book_blocker(
            self.booking.start_date,
            self.booking.people_count,
            self.availability.records(),
            &self.ledger,
        )
    }

    pub fn share_blocker(&self) -> Option<ShareBlocker> {
        readiness::share_blocker(&self.trip)
    }
}
