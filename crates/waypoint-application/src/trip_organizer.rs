//! The trip organizer use case.
//!
//! `TripOrganizer` owns the [`TripState`] of one trip being edited. Every
//! operation commits its local mutation under the state lock, releases the
//! lock, then performs remote work. The lock is never held across a remote
//! call, so operations commit in invocation order while availability checks,
//! uploads and saves proceed concurrently.

use crate::autosave_scheduler::{AutosaveScheduler, SaveFn};
use crate::services::OrganizerServices;
use chrono::NaiveDate;
use futures::FutureExt;
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use waypoint_core::autosave::SaveAction;
use waypoint_core::availability::{AvailabilityResponse, WriteOutcome};
use waypoint_core::navigation::Route;
use waypoint_core::selection::LineItemKey;
use waypoint_core::state::{AvailabilityBatch, TripState};
use waypoint_core::trip::{Location, MediaSlot, Service, UploadFile};
use waypoint_core::{Result, WaypointError};

/// What became of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Another autosave was already in flight
    Dropped,
    /// The autosave failed; the error was logged
    Failed,
    /// An explicit save succeeded and the organizer moved on
    Navigated(Route),
}

/// An availability check running in the background.
#[derive(Debug)]
pub struct PendingCheck {
    handle: JoinHandle<Result<WriteOutcome>>,
}

impl PendingCheck {
    /// Waits for the check and reports whether its result was recorded.
    pub async fn wait(self) -> Result<WriteOutcome> {
        self.handle
            .await
            .map_err(|e| WaypointError::internal(format!("availability task failed: {e}")))?
    }
}

struct Inner {
    state: Mutex<TripState>,
    services: OrganizerServices,
    autosave_in_flight: AtomicBool,
    scheduler: AutosaveScheduler,
}

/// Cheap to clone; clones share the same trip.
#[derive(Clone)]
pub struct TripOrganizer {
    inner: Arc<Inner>,
}

impl TripOrganizer {
    /// Creates an organizer and starts its autosave scheduler.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(state: TripState, services: OrganizerServices, debounce: Duration) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let weak = weak.clone();
            let save: SaveFn = Arc::new(move || {
                let weak = weak.clone();
                async move {
                    if let Some(inner) = weak.upgrade() {
                        let organizer = TripOrganizer { inner };
                        if let Err(e) = organizer.patch_trip(SaveAction::Autosave).await {
                            tracing::warn!(target: "autosave", "Autosave errored: {}", e);
                        }
                    }
                }
                .boxed()
            });

            Inner {
                state: Mutex::new(state),
                services,
                autosave_in_flight: AtomicBool::new(false),
                scheduler: AutosaveScheduler::spawn(debounce, save),
            }
        });

        Self { inner }
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> TripState {
        self.inner.state.lock().await.clone()
    }

    fn schedule_autosave(&self) {
        self.inner.scheduler.notify();
    }

    // ============================================================================
    // Itinerary
    // ============================================================================

    /// Adds a service to a day. When a start date is known the new line item
    /// is checked for availability in the background.
    pub async fn add_service(&self, day: u32, service: Service) -> Result<Option<PendingCheck>> {
        let check = {
            let mut state = self.inner.state.lock().await;
            let key = state.add_service(day, service)?;
            state.line_item_check(&key)
        };
        self.schedule_autosave();

        Ok(check.map(|(generation, request)| {
            let organizer = self.clone();
            PendingCheck {
                handle: tokio::spawn(async move {
                    let outcome = organizer
                        .inner
                        .services
                        .availability
                        .check(&request.key.service_id, &request.query)
                        .await;
                    let mut state = organizer.inner.state.lock().await;
                    let written = state.apply_availability_record(generation, request.key, outcome);
                    log_discard("line item check", &written);
                    Ok(written)
                }),
            }
        }))
    }

    pub async fn remove_service(&self, day: u32, service_id: &str) -> Result<()> {
        self.inner
            .state
            .lock()
            .await
            .remove_service(day, service_id)?;
        self.schedule_autosave();
        Ok(())
    }

    /// Records the option chosen for a line item. The price is recomputed
    /// before the save is scheduled.
    pub async fn select_option(
        &self,
        day: u32,
        service_id: &str,
        availability_code: &str,
        price: Option<f64>,
    ) {
        self.inner
            .state
            .lock()
            .await
            .select_option(day, service_id, availability_code, price);
        self.schedule_autosave();
    }

    /// Appends a day and returns its number.
    pub async fn handle_add_day(&self) -> u32 {
        let day = self.inner.state.lock().await.add_day();
        self.schedule_autosave();
        day
    }

    // ============================================================================
    // Trip details
    // ============================================================================

    pub async fn change_trip_name(&self, title: &str) {
        self.inner.state.lock().await.rename(title);
        self.schedule_autosave();
    }

    /// Sets the start date and rechecks every line item. Clearing the date
    /// starts no check.
    ///
    /// The check is stamped before this returns, so a later check always
    /// supersedes it.
    pub async fn change_dates(&self, start_date: Option<NaiveDate>) -> Result<Option<PendingCheck>> {
        let batch = {
            let mut state = self.inner.state.lock().await;
            state.set_start_date(start_date);
            let people_count = state.booking().people_count;
            start_date
                .map(|start| state.begin_availability_batch(start, people_count))
                .transpose()
        };
        self.schedule_autosave();

        Ok(batch?.map(|batch| self.spawn_availability_batch(batch)))
    }

    /// Sets the guest count and rechecks every line item when a start date
    /// is known.
    pub async fn change_guests(&self, people_count: Option<u32>) -> Result<Option<PendingCheck>> {
        let batch = {
            let mut state = self.inner.state.lock().await;
            state.set_people_count(people_count);
            state
                .booking()
                .start_date
                .map(|start| state.begin_availability_batch(start, people_count))
                .transpose()
        };
        self.schedule_autosave();

        Ok(batch?.map(|batch| self.spawn_availability_batch(batch)))
    }

    /// Looks up a place and makes it the trip location.
    ///
    /// On failure nothing changes and the error is returned after logging.
    pub async fn handle_location_change(&self, address: &str, place_id: &str) -> Result<Location> {
        let location = match self.inner.services.geocoder.place_details(place_id).await {
            Ok(details) => Location::from_place(&details),
            Err(e) => Err(e),
        };
        let location = location.map_err(|e| {
            tracing::error!("[TripOrganizer] Geocoding '{}' failed: {}", address, e);
            e
        })?;

        self.inner.state.lock().await.set_location(location.clone());
        self.schedule_autosave();
        Ok(location)
    }

    /// Uploads a picked file and uses it as the trip cover.
    pub async fn on_file_select(&self, file: UploadFile, slot: MediaSlot) -> Result<String> {
        let file_name = file.file_name.clone();
        let url = self
            .inner
            .services
            .media
            .upload(file)
            .await
            .map_err(|e| {
                tracing::error!("[TripOrganizer] Upload of '{}' failed: {}", file_name, e);
                e
            })?;

        match slot {
            MediaSlot::Cover => self.inner.state.lock().await.set_cover(&url),
        }
        self.schedule_autosave();
        Ok(url)
    }

    // ============================================================================
    // Availability
    // ============================================================================

    fn spawn_availability_batch(&self, batch: AvailabilityBatch) -> PendingCheck {
        let organizer = self.clone();
        PendingCheck {
            handle: tokio::spawn(async move { Ok(organizer.run_availability_batch(batch).await) }),
        }
    }

    /// Checks every line item for the given dates and guests.
    ///
    /// The batch is stamped before any request goes out; its results are
    /// dropped if a newer batch has been recorded by the time they arrive.
    pub async fn check_all_services_availability(
        &self,
        start_date: NaiveDate,
        people_count: Option<u32>,
    ) -> Result<WriteOutcome> {
        let batch = self
            .inner
            .state
            .lock()
            .await
            .begin_availability_batch(start_date, people_count)?;
        Ok(self.run_availability_batch(batch).await)
    }

    /// Sends the requests of a stamped batch and applies their outcomes.
    async fn run_availability_batch(&self, batch: AvailabilityBatch) -> WriteOutcome {
        tracing::debug!(
            target: "availability",
            "Checking {} line items (generation {})",
            batch.requests.len(),
            batch.generation
        );

        let availability = &self.inner.services.availability;
        let responses = join_all(
            batch
                .requests
                .iter()
                .map(|request| availability.check(&request.key.service_id, &request.query)),
        )
        .await;

        for (request, response) in batch.requests.iter().zip(&responses) {
            if let Err(e) = response {
                tracing::warn!(
                    target: "availability",
                    "Check for {} failed, marking unknown: {}",
                    request.key,
                    e
                );
            }
        }

        let outcomes: Vec<(LineItemKey, Result<AvailabilityResponse>)> = batch
            .requests
            .into_iter()
            .map(|request| request.key)
            .zip(responses)
            .collect();

        let written = self
            .inner
            .state
            .lock()
            .await
            .apply_availability_batch(batch.generation, outcomes);
        log_discard("availability batch", &written);
        written
    }

    // ============================================================================
    // Saving
    // ============================================================================

    /// Writes the trip to the backend.
    ///
    /// Autosaves are best effort: one at a time, failures logged and
    /// swallowed. Share and book always send, surface failures in the save
    /// status and return them, and navigate on success.
    pub async fn patch_trip(&self, action: SaveAction) -> Result<SaveOutcome> {
        if !action.is_explicit() {
            return Ok(self.autosave().await);
        }

        let blocker = {
            let mut state = self.inner.state.lock().await;
            let blocker = match action {
                SaveAction::Share => state.share_blocker().map(|b| b.to_string()),
                _ => state.book_blocker().map(|b| b.to_string()),
            };
            match &blocker {
                Some(message) => state.finish_explicit_save(Some(message.clone())),
                None => state.begin_explicit_save(),
            }
            blocker
        };
        if let Some(message) = blocker {
            return Err(WaypointError::validation(message));
        }

        match self.send_patch(action).await {
            Ok(trip_id) => {
                {
                    let mut state = self.inner.state.lock().await;
                    state.finish_explicit_save(None);
                    if action == SaveAction::Share {
                        state.mark_public();
                    }
                }
                let route = action
                    .route(&trip_id)
                    .ok_or_else(|| WaypointError::internal("explicit save without a route"))?;
                tracing::info!("[TripOrganizer] Saved trip {}, navigating to {}", trip_id, route);
                self.inner.services.navigator.navigate(&route);
                Ok(SaveOutcome::Navigated(route))
            }
            Err(e) => {
                tracing::error!("[TripOrganizer] {:?} failed: {}", action, e);
                self.inner
                    .state
                    .lock()
                    .await
                    .finish_explicit_save(Some(e.to_string()));
                Err(e)
            }
        }
    }

    async fn autosave(&self) -> SaveOutcome {
        if self.inner.autosave_in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!(target: "autosave", "Autosave already in flight, dropping");
            return SaveOutcome::Dropped;
        }

        let result = self.send_patch(SaveAction::Autosave).await;
        self.inner.autosave_in_flight.store(false, Ordering::SeqCst);

        match result {
            Ok(trip_id) => {
                tracing::debug!(target: "autosave", "Autosaved trip {}", trip_id);
                SaveOutcome::Saved
            }
            Err(e) => {
                tracing::warn!(target: "autosave", "Autosave failed: {}", e);
                SaveOutcome::Failed
            }
        }
    }

    /// Snapshots the trip and PATCHes it. Returns the trip id.
    async fn send_patch(&self, action: SaveAction) -> Result<String> {
        let (trip_id, body) = {
            let state = self.inner.state.lock().await;
            let trip_id = state
                .trip_id()
                .ok_or_else(|| WaypointError::validation("trip has not been created yet"))?
                .to_string();
            (trip_id, state.to_patch_body(action))
        };

        self.inner.services.trips.patch_trip(&trip_id, &body).await?;
        Ok(trip_id)
    }
}

fn log_discard(operation: &str, written: &WriteOutcome) {
    if let WriteOutcome::Discarded { reason } = written {
        tracing::debug!(
            target: "availability",
            "{}",
            reason.clone().into_error(operation)
        );
    }
}
