//! Debounced autosave state machine.
//!
//! ```text
//!            mutation                 timer expired
//!   Idle ─────────────▶ Scheduled ─────────────────▶ InFlight
//!    ▲                   │    ▲                        │  │
//!    │                   └────┘ mutation               │  │ mutation
//!    │                   (timer reset)                 │  ▼
//!    └──────────── save complete, clean ───────────── InFlight{dirty}
//!                                                      │
//!                        save complete, dirty ─────────┘──▶ Scheduled
//! ```
//!
//! The machine only tracks state; the application layer owns the timer and
//! the save itself.

use crate::navigation::Route;
use std::time::Duration;
use tokio::time::Instant;

/// Quiet period after the last mutation before an autosave fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);

/// Why a trip is being written to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveAction {
    /// Background save; best effort, dropped while another one is in flight
    Autosave,
    /// Publish the trip and show it
    Share,
    /// Save and continue to checkout
    Book,
}

impl SaveAction {
    /// Where the organizer goes once this save succeeds.
    pub fn route(self, trip_id: &str) -> Option<Route> {
        match self {
            Self::Autosave => None,
            Self::Share => Some(Route::Trip(trip_id.to_string())),
            Self::Book => Some(Route::Checkout(trip_id.to_string())),
        }
    }

    /// Explicit saves bypass the autosave guard and surface their errors.
    pub fn is_explicit(self) -> bool {
        !matches!(self, Self::Autosave)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveState {
    Idle,
    Scheduled { deadline: Instant },
    InFlight { dirty: bool },
}

#[derive(Debug, Clone)]
pub struct AutosaveMachine {
    state: AutosaveState,
    debounce: Duration,
}

impl Default for AutosaveMachine {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl AutosaveMachine {
    pub fn new(debounce: Duration) -> Self {
        Self {
            state: AutosaveState::Idle,
            debounce,
        }
    }

    pub fn state(&self) -> AutosaveState {
        self.state
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// When the pending save should fire, if one is scheduled.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            AutosaveState::Scheduled { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// A local mutation committed.
    pub fn on_mutation(&mut self, now: Instant) {
        self.state = match self.state {
            AutosaveState::Idle | AutosaveState::Scheduled { .. } => AutosaveState::Scheduled {
                deadline: now + self.debounce,
            },
            AutosaveState::InFlight { .. } => AutosaveState::InFlight { dirty: true },
        };
    }

    /// The timer fired. Returns `true` when a save should start now.
    pub fn on_timer(&mut self, now: Instant) -> bool {
        match self.state {
            AutosaveState::Scheduled { deadline } if now >= deadline => {
                self.state = AutosaveState::InFlight { dirty: false };
                true
            }
            _ => false,
        }
    }

    /// The save started by [`on_timer`](Self::on_timer) finished, whatever
    /// its outcome.
    pub fn on_save_complete(&mut self, now: Instant) {
        self.state = match self.state {
            AutosaveState::InFlight { dirty: true } => AutosaveState::Scheduled {
                deadline: now + self.debounce,
            },
            AutosaveState::InFlight { dirty: false } => AutosaveState::Idle,
            other => other,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutations_reset_the_deadline() {
        let mut machine = AutosaveMachine::default();
        let start = Instant::now();

        machine.on_mutation(start);
        machine.on_mutation(start + Duration::from_millis(1500));

        assert_eq!(
            machine.deadline(),
            Some(start + Duration::from_millis(3500))
        );
        assert!(!machine.on_timer(start + Duration::from_secs(2)));
        assert!(machine.on_timer(start + Duration::from_millis(3500)));
        assert_eq!(machine.state(), AutosaveState::InFlight { dirty: false });
    }

    #[test]
    fn test_mutation_during_save_schedules_one_more_cycle() {
        let mut machine = AutosaveMachine::new(Duration::from_millis(100));
        let start = Instant::now();
        machine.on_mutation(start);
        assert!(machine.on_timer(start + Duration::from_millis(100)));

        machine.on_mutation(start + Duration::from_millis(150));
        machine.on_mutation(start + Duration::from_millis(160));
        assert_eq!(machine.state(), AutosaveState::InFlight { dirty: true });

        let done = start + Duration::from_millis(200);
        machine.on_save_complete(done);
        assert_eq!(machine.deadline(), Some(done + Duration::from_millis(100)));

        assert!(machine.on_timer(done + Duration::from_millis(100)));
        machine.on_save_complete(done + Duration::from_millis(150));
        assert_eq!(machine.state(), AutosaveState::Idle);
    }

    #[test]
    fn test_timer_without_schedule_does_nothing() {
        let mut machine = AutosaveMachine::default();
        assert!(!machine.on_timer(Instant::now()));
        machine.on_save_complete(Instant::now());
        assert_eq!(machine.state(), AutosaveState::Idle);
    }

    #[test]
    fn test_routes_for_explicit_saves() {
        assert_eq!(SaveAction::Autosave.route("t1"), None);
        assert_eq!(SaveAction::Share.route("t1"), Some(Route::Trip("t1".into())));
        assert_eq!(
            SaveAction::Book.route("t1").map(|route| route.path()),
            Some("/trips/checkout/t1".to_string())
        );
        assert!(!SaveAction::Autosave.is_explicit());
        assert!(SaveAction::Share.is_explicit() && SaveAction::Book.is_explicit());
    }
}
