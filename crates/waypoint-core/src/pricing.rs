//! Trip price derived from availability, selections and the itinerary.

use crate::availability::AvailabilityRecord;
use crate::itinerary::Day;
use crate::selection::{LineItemKey, SelectionLedger};

/// Sums the price of every availability-tracked line item.
///
/// A line item contributes the price of its selected option when one was
/// chosen with a price, otherwise the intrinsic base price of its service.
/// Records whose line item is no longer in the itinerary contribute nothing.
pub fn base_price(records: &[AvailabilityRecord], ledger: &SelectionLedger, days: &[Day]) -> f64 {
    records
        .iter()
        .filter_map(|record| line_item_price(&record.key, ledger, days))
        .sum()
}

fn line_item_price(key: &LineItemKey, ledger: &SelectionLedger, days: &[Day]) -> Option<f64> {
    let service_price = days
        .iter()
        .find(|day| day.day == key.day)?
        .data
        .iter()
        .find(|assignment| assignment.service.id == key.service_id)
        .map(|assignment| assignment.service.base_price)?;

    Some(
        ledger
            .get(key)
            .and_then(|selection| selection.price)
            .unwrap_or(service_price),
    )
}
