//! Availability of line items for the chosen dates and guest count.
//!
//! Availability checks run concurrently with edits. Every batch of checks is
//! stamped with a generation taken from [`AvailabilityCache::begin_batch`];
//! a completion is applied only when its generation is not older than the one
//! the cache currently holds.

use crate::error::{Result, WaypointError};
use crate::itinerary::date_for_day;
use crate::selection::LineItemKey;
use crate::trip::ServiceId;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Monotonic stamp of an availability batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Available,
    Unavailable,
    /// The check failed; treated as not bookable
    Unknown,
}

/// Last known availability of one line item.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityRecord {
    pub key: LineItemKey,
    pub status: AvailabilityStatus,
    pub grouped_options: Option<Value>,
    pub price: Option<f64>,
    pub generation: Generation,
}

impl AvailabilityRecord {
    /// Builds a record from the outcome of a check. A failed check yields an
    /// `Unknown` record rather than no record at all.
    pub fn from_outcome(
        key: LineItemKey,
        generation: Generation,
        outcome: &Result<AvailabilityResponse>,
    ) -> Self {
        match outcome {
            Ok(response) => Self {
                key,
                status: if response.is_available {
                    AvailabilityStatus::Available
                } else {
                    AvailabilityStatus::Unavailable
                },
                grouped_options: response.grouped_options.clone(),
                price: response.price,
                generation,
            },
            Err(_) => Self::unknown(key, generation),
        }
    }

    pub fn unknown(key: LineItemKey, generation: Generation) -> Self {
        Self {
            key,
            status: AvailabilityStatus::Unknown,
            grouped_options: None,
            price: None,
            generation,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == AvailabilityStatus::Available
    }

    /// Whether the service offers options the traveller has to choose from.
    pub fn has_options(&self) -> bool {
        match &self.grouped_options {
            None | Some(Value::Null) => false,
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Object(map)) => !map.is_empty(),
            Some(_) => true,
        }
    }
}

/// Body of `POST /services/{id}/availability`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    /// `YYYY-MM-DD`
    pub booking_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people_count: Option<u32>,
}

impl AvailabilityQuery {
    /// Query for a line item: the booking date is the trip start shifted by
    /// `day - 1`.
    pub fn for_line_item(start_date: NaiveDate, day: u32, people_count: Option<u32>) -> Result<Self> {
        let booking_date = date_for_day(start_date, day).ok_or_else(|| {
            WaypointError::validation(format!("day {day} is out of the calendar range"))
        })?;
        Ok(Self {
            booking_date,
            people_count,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub is_available: bool,
    #[serde(default)]
    pub grouped_options: Option<Value>,
    #[serde(default)]
    pub price: Option<f64>,
}

/// Checks whether a service can be booked on a date.
#[async_trait]
pub trait AvailabilityService: Send + Sync {
    async fn check(
        &self,
        service_id: &ServiceId,
        query: &AvailabilityQuery,
    ) -> Result<AvailabilityResponse>;
}

/// Result of offering a write to the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    Discarded { reason: DiscardReason },
}

impl WriteOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    Stale {
        generation: Generation,
        current: Generation,
    },
    /// The line item left the itinerary while its check was in flight
    Removed { key: LineItemKey },
}

impl DiscardReason {
    pub fn into_error(self, operation: impl Into<String>) -> WaypointError {
        match self {
            Self::Stale {
                generation,
                current,
            } => WaypointError::StaleData {
                operation: operation.into(),
                generation: generation.value(),
                current: current.value(),
            },
            Self::Removed { key } => WaypointError::not_found("line item", key.to_string()),
        }
    }
}

/// Availability records for the current itinerary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AvailabilityCache {
    records: Vec<AvailabilityRecord>,
    generation: Generation,
    is_checking: bool,
}

impl AvailabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_checking(&self) -> bool {
        self.is_checking
    }

    pub fn records(&self) -> &[AvailabilityRecord] {
        &self.records
    }

    pub fn get(&self, key: &LineItemKey) -> Option<&AvailabilityRecord> {
        self.records.iter().find(|record| &record.key == key)
    }

    /// Stamps a new batch. The returned generation must accompany the batch
    /// when it is applied.
    pub fn begin_batch(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.is_checking = true;
        self.generation
    }

    /// Replaces the records with a completed batch.
    ///
    /// Records appended under a generation at least as new as the batch keep
    /// their place unless the batch covers the same line item.
    pub fn apply_batch(
        &mut self,
        generation: Generation,
        records: Vec<AvailabilityRecord>,
    ) -> WriteOutcome {
        if let Some(reason) = self.stale(generation) {
            return WriteOutcome::Discarded { reason };
        }

        let batch_keys: HashSet<LineItemKey> =
            records.iter().map(|record| record.key.clone()).collect();
        let survivors: Vec<AvailabilityRecord> = self
            .records
            .drain(..)
            .filter(|record| record.generation >= generation && !batch_keys.contains(&record.key))
            .collect();

        self.records = records;
        self.records.extend(survivors);
        self.generation = generation;
        self.is_checking = false;
        WriteOutcome::Applied
    }

    /// Adds or replaces the record of a single line item.
    pub fn append(&mut self, record: AvailabilityRecord) -> WriteOutcome {
        if let Some(reason) = self.stale(record.generation) {
            return WriteOutcome::Discarded { reason };
        }

        match self.records.iter_mut().find(|r| r.key == record.key) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
        WriteOutcome::Applied
    }

    pub fn remove(&mut self, key: &LineItemKey) -> Option<AvailabilityRecord> {
        let index = self.records.iter().position(|record| &record.key == key)?;
        Some(self.records.remove(index))
    }

    /// Drops records whose line item is not in `keys`.
    pub fn retain_keys(&mut self, keys: &HashSet<LineItemKey>) {
        self.records.retain(|record| keys.contains(&record.key));
    }

    fn stale(&self, generation: Generation) -> Option<DiscardReason> {
        (generation < self.generation).then_some(DiscardReason::Stale {
            generation,
            current: self.generation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(day: u32, id: &str, status: AvailabilityStatus, generation: Generation) -> AvailabilityRecord {
        AvailabilityRecord {
            key: LineItemKey::new(day, id),
            status,
            grouped_options: None,
            price: None,
            generation,
        }
    }

    #[test]
    fn test_query_shifts_start_date_by_day() {
        let start = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        let query = AvailabilityQuery::for_line_item(start, 3, Some(2)).unwrap();

        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({ "bookingDate": "2025-01-01", "peopleCount": 2 })
        );

        let query = AvailabilityQuery::for_line_item(start, 1, None).unwrap();
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({ "bookingDate": "2024-12-30" })
        );
    }

    #[test]
    fn test_generation_is_monotonic() {
        let mut cache = AvailabilityCache::new();
        let first = cache.begin_batch();
        let second = cache.begin_batch();

        assert!(second > first);
        assert_eq!(cache.generation(), second);
        assert!(cache.is_checking());
    }

    #[test]
    fn test_older_batch_is_discarded_after_newer_one() {
        let mut cache = AvailabilityCache::new();
        let older = cache.begin_batch();
        let newer = cache.begin_batch();

        let outcome = cache.apply_batch(
            newer,
            vec![record(1, "s1", AvailabilityStatus::Available, newer)],
        );
        assert!(outcome.is_applied());
        assert!(!cache.is_checking());

        let outcome = cache.apply_batch(
            older,
            vec![record(1, "s1", AvailabilityStatus::Unavailable, older)],
        );
        assert_eq!(
            outcome,
            WriteOutcome::Discarded {
                reason: DiscardReason::Stale {
                    generation: older,
                    current: newer
                }
            }
        );
        assert!(cache.get(&LineItemKey::new(1, "s1")).unwrap().is_available());
    }

    #[test]
    fn test_batch_keeps_newer_appended_records() {
        let mut cache = AvailabilityCache::new();
        let old = cache.begin_batch();
        cache.apply_batch(old, vec![record(1, "s1", AvailabilityStatus::Available, old)]);

        let batch = cache.begin_batch();
        cache.append(record(2, "s2", AvailabilityStatus::Available, batch));
        cache.apply_batch(batch, vec![record(1, "s1", AvailabilityStatus::Unavailable, batch)]);

        assert_eq!(cache.records().len(), 2);
        assert!(!cache.get(&LineItemKey::new(1, "s1")).unwrap().is_available());
        assert!(cache.get(&LineItemKey::new(2, "s2")).is_some());
    }

    #[test]
    fn test_batch_drops_records_from_older_generations() {
        let mut cache = AvailabilityCache::new();
        let old = cache.begin_batch();
        cache.apply_batch(old, vec![record(1, "gone", AvailabilityStatus::Available, old)]);

        let batch = cache.begin_batch();
        cache.apply_batch(batch, vec![]);

        assert!(cache.records().is_empty());
    }

    #[test]
    fn test_stale_append_is_discarded() {
        let mut cache = AvailabilityCache::new();
        let issued = cache.generation();
        cache.begin_batch();

        let outcome = cache.append(record(1, "s1", AvailabilityStatus::Available, issued));

        assert!(!outcome.is_applied());
        assert!(cache.records().is_empty());
    }

    #[test]
    fn test_failed_check_records_unknown_status() {
        let key = LineItemKey::new(1, "s1");
        let outcome: Result<AvailabilityResponse> =
            Err(WaypointError::remote_status("check availability", 500, "boom"));

        let record = AvailabilityRecord::from_outcome(key, Generation::new(4), &outcome);

        assert_eq!(record.status, AvailabilityStatus::Unknown);
        assert!(!record.is_available());
        assert_eq!(record.generation.value(), 4);
    }

    #[test]
    fn test_grouped_options_presence() {
        let mut r = record(1, "s1", AvailabilityStatus::Available, Generation::default());
        assert!(!r.has_options());
        r.grouped_options = Some(json!([]));
        assert!(!r.has_options());
        r.grouped_options = Some(json!([{ "code": "morning" }]));
        assert!(r.has_options());
    }

    #[test]
    fn test_discard_reason_converts_to_stale_error() {
        let reason = DiscardReason::Stale {
            generation: Generation::new(1),
            current: Generation::new(3),
        };
        let err = reason.into_error("availability batch");
        assert!(err.is_stale());
    }
}
