//! Error types for the Waypoint trip organizer.

use thiserror::Error;

/// A shared error type for the entire Waypoint workspace.
///
/// Variants follow the failure taxonomy of the organizer: local validation
/// failures, remote call failures (backend, geocoding, wallet lookups), and
/// stale writes rejected by generation comparison.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WaypointError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound { entity_type: String, id: String },

    /// A required field is missing or malformed; blocks submission
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A remote call failed (network, 4xx or 5xx)
    #[error("Remote call '{operation}' failed{}: {message}", status_suffix(.status))]
    Remote {
        operation: String,
        status: Option<u16>,
        message: String,
    },

    /// A remote result arrived after a newer one had been recorded
    #[error("Stale {operation} result discarded (generation {generation} < {current})")]
    StaleData {
        operation: String,
        generation: u64,
        current: u64,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" (HTTP {code})")).unwrap_or_default()
}

impl WaypointError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Remote error without an HTTP status (transport failure)
    pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            operation: operation.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Creates a Remote error carrying the HTTP status of the response
    pub fn remote_status(
        operation: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::Remote {
            operation: operation.into(),
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a remote call failure
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// Check if this is a stale-data rejection
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleData { .. })
    }

    /// Returns the HTTP status of a remote failure, if the server answered.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => *status,
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for WaypointError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for WaypointError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for WaypointError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for WaypointError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, WaypointError>`.
pub type Result<T> = std::result::Result<T, WaypointError>;
