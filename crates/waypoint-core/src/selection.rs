//! Option selection ledger keyed by line item.

use crate::trip::{SelectedServiceOption, ServiceId};
use std::collections::BTreeMap;
use std::fmt;

/// Identifies one line item of the itinerary: a service on a given day.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineItemKey {
    pub day: u32,
    pub service_id: ServiceId,
}

impl LineItemKey {
    pub fn new(day: u32, service_id: impl Into<ServiceId>) -> Self {
        Self {
            day,
            service_id: service_id.into(),
        }
    }
}

impl fmt::Display for LineItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {}/{}", self.day, self.service_id)
    }
}

/// The option chosen for a line item.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSelection {
    pub availability_code: String,
    /// Price of the chosen option; `None` falls back to the service base price
    pub price: Option<f64>,
}

impl OptionSelection {
    pub fn new(availability_code: impl Into<String>, price: Option<f64>) -> Self {
        Self {
            availability_code: availability_code.into(),
            price,
        }
    }
}

/// Mapping from line item to chosen option.
///
/// Ordered by key so the persisted list is stable between saves.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionLedger {
    entries: BTreeMap<LineItemKey, OptionSelection>,
}

impl SelectionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the ledger from the list stored on a trip. Later entries for
    /// the same line item win.
    pub fn from_selected_options(options: &[SelectedServiceOption]) -> Self {
        let mut ledger = Self::new();
        for option in options {
            ledger.select(
                LineItemKey::new(option.day, option.service_id.clone()),
                OptionSelection::new(option.availability_code.clone(), option.price),
            );
        }
        ledger
    }

    /// Inserts or overwrites the selection for a line item.
    pub fn select(&mut self, key: LineItemKey, selection: OptionSelection) {
        self.entries.insert(key, selection);
    }

    pub fn get(&self, key: &LineItemKey) -> Option<&OptionSelection> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &LineItemKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &LineItemKey) -> Option<OptionSelection> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LineItemKey, &OptionSelection)> {
        self.entries.iter()
    }

    /// Flattens the ledger into the list persisted under
    /// `otherAttributes.selectedServiceOptions`.
    pub fn to_selected_options(&self) -> Vec<SelectedServiceOption> {
        self.entries
            .iter()
            .map(|(key, selection)| SelectedServiceOption {
                day: key.day,
                service_id: key.service_id.clone(),
                availability_code: selection.availability_code.clone(),
                price: selection.price,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_is_idempotent_per_key() {
        let mut ledger = SelectionLedger::new();
        let key = LineItemKey::new(1, "s1");

        ledger.select(key.clone(), OptionSelection::new("opt-a", Some(50.0)));
        let once = ledger.clone();
        ledger.select(key.clone(), OptionSelection::new("opt-a", Some(50.0)));

        assert_eq!(ledger, once);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_select_overwrites_previous_choice() {
        let mut ledger = SelectionLedger::new();
        let key = LineItemKey::new(2, "s1");

        ledger.select(key.clone(), OptionSelection::new("opt-a", Some(50.0)));
        ledger.select(key.clone(), OptionSelection::new("opt-b", None));

        let selection = ledger.get(&key).unwrap();
        assert_eq!(selection.availability_code, "opt-b");
        assert_eq!(selection.price, None);
    }

    #[test]
    fn test_same_service_on_different_days_is_tracked_separately() {
        let mut ledger = SelectionLedger::new();
        ledger.select(LineItemKey::new(1, "s1"), OptionSelection::new("a", None));
        ledger.select(LineItemKey::new(2, "s1"), OptionSelection::new("b", None));

        ledger.remove(&LineItemKey::new(1, "s1"));

        assert!(!ledger.contains(&LineItemKey::new(1, "s1")));
        assert!(ledger.contains(&LineItemKey::new(2, "s1")));
    }

    #[test]
    fn test_persisted_list_round_trips_through_trip_attributes() {
        let options = vec![
            SelectedServiceOption {
                day: 2,
                service_id: "s2".into(),
                availability_code: "late".into(),
                price: Some(80.0),
            },
            SelectedServiceOption {
                day: 1,
                service_id: "s1".into(),
                availability_code: "early".into(),
                price: None,
            },
        ];

        let ledger = SelectionLedger::from_selected_options(&options);
        let flattened = ledger.to_selected_options();

        assert_eq!(flattened.len(), 2);
        assert_eq!(flattened[0].day, 1);
        assert_eq!(flattened[1].availability_code, "late");
    }
}
