//! Navigation targets reached after an explicit save.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Public trip page
    Trip(String),
    /// Checkout for a trip
    Checkout(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Trip(id) => format!("/trips/{id}"),
            Self::Checkout(id) => format!("/trips/checkout/{id}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Moves the user to another screen.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &Route);
}

/// A navigator that goes nowhere, for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpNavigator;

impl Navigator for NoOpNavigator {
    fn navigate(&self, route: &Route) {
        tracing::debug!("[NoOpNavigator] Ignoring navigation to {}", route);
    }
}
