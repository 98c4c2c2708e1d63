//! Day-indexed itinerary projected from a trip's flat assignment list.

use crate::trip::{DayAssignment, ServiceId};
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Number of days covered by a duration in minutes, rounding up.
pub fn minutes_to_days(minutes: u32) -> u32 {
    minutes.div_ceil(MINUTES_PER_DAY)
}

pub fn days_to_minutes(days: u32) -> u32 {
    days.saturating_mul(MINUTES_PER_DAY)
}

/// Calendar date of a one-based trip day.
pub fn date_for_day(start_date: NaiveDate, day: u32) -> Option<NaiveDate> {
    start_date.checked_add_days(Days::new(u64::from(day.saturating_sub(1))))
}

/// One day of the itinerary.
///
/// Days are derived from the assignment list and never edited in place by
/// callers; the organizer rebuilds or appends them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Day {
    /// One-based day number
    pub day: u32,
    /// Human label, e.g. "Day 3"
    pub title: String,
    /// Calendar date, when the trip has a start date
    pub date: Option<NaiveDate>,
    /// Assignments for this day in their original relative order
    pub data: Vec<DayAssignment>,
}

impl Day {
    pub fn empty(day: u32, start_date: Option<NaiveDate>) -> Self {
        Self {
            day,
            title: Self::label(day),
            date: start_date.and_then(|start| date_for_day(start, day)),
            data: Vec::new(),
        }
    }

    pub fn label(day: u32) -> String {
        format!("Day {day}")
    }

    pub fn contains_service(&self, service_id: &str) -> bool {
        self.data.iter().any(|a| a.service.id == service_id)
    }
}

/// Groups assignments into days `1..=minutes_to_days(duration_minutes)`.
///
/// Every day in range is present, empty or not. Assignments that reference a
/// day outside the range are dropped.
pub fn project(
    assignments: &[DayAssignment],
    duration_minutes: u32,
    start_date: Option<NaiveDate>,
) -> Vec<Day> {
    let day_count = minutes_to_days(duration_minutes);
    let mut days: Vec<Day> = (1..=day_count)
        .map(|day| Day::empty(day, start_date))
        .collect();

    for assignment in assignments {
        let Some(index) = assignment.day.checked_sub(1) else {
            continue;
        };
        if let Some(day) = days.get_mut(index as usize) {
            day.data.push(assignment.clone());
        }
    }

    days
}

/// Flattens an itinerary back into the assignment list stored on the trip.
pub fn flatten(days: &[Day]) -> Vec<DayAssignment> {
    days.iter().flat_map(|day| day.data.iter().cloned()).collect()
}

/// Index from service to the days it currently occupies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DaysByService(HashMap<ServiceId, Vec<u32>>);

impl DaysByService {
    pub fn from_days(days: &[Day]) -> Self {
        let mut index = Self::default();
        for assignment in days.iter().flat_map(|day| day.data.iter()) {
            index.insert(&assignment.service.id, assignment.day);
        }
        index
    }

    pub fn insert(&mut self, service_id: &str, day: u32) {
        self.0.entry(service_id.to_string()).or_default().push(day);
    }

    /// Removes every occurrence of `day` for the service.
    pub fn remove(&mut self, service_id: &str, day: u32) {
        if let Some(days) = self.0.get_mut(service_id) {
            days.retain(|d| *d != day);
            if days.is_empty() {
                self.0.remove(service_id);
            }
        }
    }

    pub fn days(&self, service_id: &str) -> &[u32] {
        self.0.get(service_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::Service;
    use proptest::prelude::*;

    fn assignment(day: u32, service_id: &str) -> DayAssignment {
        DayAssignment::new(day, Service::new(service_id, service_id, 10.0))
    }

    #[test]
    fn test_minutes_to_days_rounds_up() {
        assert_eq!(minutes_to_days(0), 0);
        assert_eq!(minutes_to_days(1), 1);
        assert_eq!(minutes_to_days(1440), 1);
        assert_eq!(minutes_to_days(1441), 2);
        assert_eq!(days_to_minutes(3), 4320);
    }

    #[test]
    fn test_project_keeps_empty_days_and_order() {
        let assignments = vec![
            assignment(3, "museum"),
            assignment(1, "hotel"),
            assignment(3, "dinner"),
        ];

        let days = project(&assignments, days_to_minutes(3), None);

        assert_eq!(days.len(), 3);
        assert_eq!(days[0].title, "Day 1");
        assert_eq!(days[0].data.len(), 1);
        assert!(days[1].data.is_empty());
        let third: Vec<_> = days[2].data.iter().map(|a| a.service.id.as_str()).collect();
        assert_eq!(third, vec!["museum", "dinner"]);
    }

    #[test]
    fn test_project_drops_out_of_range_days() {
        let assignments = vec![assignment(1, "a"), assignment(4, "b"), assignment(0, "c")];

        let days = project(&assignments, days_to_minutes(2), None);

        assert_eq!(flatten(&days), vec![assignment(1, "a")]);
    }

    #[test]
    fn test_project_dates_follow_start_date() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        let days = project(&[], days_to_minutes(3), Some(start));

        assert_eq!(days[2].date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_days_by_service_tracks_add_and_remove() {
        let days = project(
            &[assignment(1, "a"), assignment(2, "a"), assignment(2, "b")],
            days_to_minutes(2),
            None,
        );
        let mut index = DaysByService::from_days(&days);
        assert_eq!(index.days("a"), &[1, 2]);

        index.insert("b", 1);
        index.remove("a", 1);
        assert_eq!(index.days("a"), &[2]);
        assert_eq!(index.days("b"), &[2, 1]);

        index.remove("a", 2);
        assert!(index.days("a").is_empty());
    }

    fn arb_assignments() -> impl Strategy<Value = Vec<DayAssignment>> {
        prop::collection::vec((0u32..8, "[a-d]"), 0..24).prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(day, id)| assignment(day, &id))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_projection_is_deterministic(assignments in arb_assignments(), days in 0u32..8) {
            let duration = days_to_minutes(days);
            prop_assert_eq!(project(&assignments, duration, None), project(&assignments, duration, None));
        }

        #[test]
        fn prop_projection_keeps_exactly_in_range_assignments(assignments in arb_assignments(), days in 0u32..8) {
            let projected = project(&assignments, days_to_minutes(days), None);

            let mut expected: Vec<_> = assignments
                .iter()
                .filter(|a| a.day >= 1 && a.day <= days)
                .cloned()
                .collect();
            expected.sort_by_key(|a| a.day);

            prop_assert_eq!(projected.len() as u32, days);
            prop_assert_eq!(flatten(&projected), expected);
        }
    }
}
