use super::utils::read_json;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;
use waypoint_application::{OrganizerServices, TripOrganizer};
use waypoint_core::availability::{AvailabilityCache, AvailabilityStatus, WriteOutcome};
use waypoint_core::selection::LineItemKey;
use waypoint_core::state::TripState;
use waypoint_core::trip::Trip;
use waypoint_infrastructure::ConfigService;

pub async fn show(
    config: &ConfigService,
    trip_path: &Path,
    start_date: Option<NaiveDate>,
    guests: Option<u32>,
    check: bool,
) -> Result<()> {
    let trip: Trip = read_json(trip_path)?;
    let mut state = TripState::from_trip(trip);
    if start_date.is_some() {
        state.set_start_date(start_date);
    }
    if guests.is_some() {
        state.set_people_count(guests);
    }

    if check {
        state = check_availability(config, state).await?;
    }

    print!("{}", render(&state));
    Ok(())
}

async fn check_availability(config: &ConfigService, state: TripState) -> Result<TripState> {
    let booking = state.booking();
    let start_date = booking
        .start_date
        .context("A start date is needed to check availability (use --start-date)")?;

    let settings = config.get_config()?;
    let organizer = TripOrganizer::new(
        state,
        OrganizerServices::http(&settings),
        settings.autosave.debounce(),
    );

    println!("🔎 Checking availability for {}...", start_date);
    if let WriteOutcome::Discarded { reason } = organizer
        .check_all_services_availability(start_date, booking.people_count)
        .await?
    {
        tracing::warn!("Availability results discarded: {:?}", reason);
    }
    Ok(organizer.snapshot().await)
}

fn status_label(availability: &AvailabilityCache, key: &LineItemKey) -> &'static str {
    match availability.get(key).map(|record| record.status) {
        Some(AvailabilityStatus::Available) => "available",
        Some(AvailabilityStatus::Unavailable) => "unavailable",
        Some(AvailabilityStatus::Unknown) => "unknown",
        None => "not checked",
    }
}

fn render(state: &TripState) -> String {
    let mut out = String::new();
    let trip = state.trip();

    let title = trip.title.translate();
    out.push_str(&format!(
        "📍 {}\n",
        if title.is_empty() { "Untitled trip" } else { title }
    ));
    let location = trip.location.display();
    if !location.is_empty() {
        out.push_str(&format!("   {}\n", location));
    }
    let booking = state.booking();
    if let Some(start) = booking.start_date {
        out.push_str(&format!("   Starts {}\n", start));
    }
    if let Some(guests) = booking.people_count {
        out.push_str(&format!("   {} guest(s)\n", guests));
    }

    for day in state.days() {
        out.push('\n');
        match day.date {
            Some(date) => out.push_str(&format!("{} ({})\n", day.title, date)),
            None => out.push_str(&format!("{}\n", day.title)),
        }
        if day.data.is_empty() {
            out.push_str("  (nothing planned)\n");
        }
        for assignment in &day.data {
            let key = assignment.key();
            let price = state
                .ledger()
                .get(&key)
                .and_then(|selection| selection.price)
                .unwrap_or(assignment.service.base_price);
            out.push_str(&format!(
                "  - {} [{}] {:.2} ({})\n",
                assignment.service.title.translate(),
                assignment.service.id,
                price,
                status_label(state.availability(), &key)
            ));
        }
    }

    out.push_str(&format!("\n💰 Base price: {:.2}\n", state.base_price()));
    match state.book_blocker() {
        Some(blocker) => out.push_str(&format!("⛔ Not bookable: {}\n", blocker)),
        None => out.push_str("✅ Ready to book\n"),
    }
    match state.share_blocker() {
        Some(blocker) => out.push_str(&format!("⛔ Not shareable: {}\n", blocker)),
        None => out.push_str("✅ Ready to share\n"),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_core::trip::{DayAssignment, Service};

    fn state() -> TripState {
        let mut trip = Trip::draft();
        trip.duration = 2 * 1440;
        trip.services = vec![DayAssignment::new(1, Service::new("s1", "Surf lesson", 45.0))];
        TripState::from_trip(trip)
    }

    #[test]
    fn test_render_lists_every_day() {
        let output = render(&state());

        assert!(output.contains("Untitled trip"));
        assert!(output.contains("Day 1"));
        assert!(output.contains("Surf lesson [s1] 45.00 (not checked)"));
        assert!(output.contains("Day 2\n  (nothing planned)"));
    }

    #[test]
    fn test_render_reports_first_book_blocker() {
        let output = render(&state());
        assert!(output.contains("Not bookable: You need to select a start date"));
        assert!(output.contains("Not shareable: You need to add a location"));
    }

    #[test]
    fn test_selected_option_price_is_shown() {
        let mut state = state();
        state.select_option(1, "s1", "morning", Some(30.0));

        assert!(render(&state).contains("Surf lesson [s1] 30.00"));
    }
}
