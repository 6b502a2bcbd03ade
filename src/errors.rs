use serde::{Deserialize, Serialize};

use crate::models::RideStatus;

/// Main error type for the ride booking engine
#[derive(Debug, thiserror::Error)]
pub enum RideError {
    // Lookup errors
    #[error("Location not found for {field}: '{name}'")]
    LocationNotFound { field: String, name: String },

    #[error("Ride not found: {0}")]
    RideNotFound(String),

    // State machine errors
    #[error("Cannot {action} ride {ride_id} while it is {from}")]
    InvalidTransition {
        ride_id: String,
        from: RideStatus,
        action: &'static str,
    },

    #[error("Ride {ride_id} is already {status}")]
    RideAlreadyTerminal { ride_id: String, status: RideStatus },

    #[error("Ride {0} is already cancelled")]
    AlreadyCancelled(String),

    #[error("Ride {ride_id} is scheduled for {date}, not today")]
    NotDueToday { ride_id: String, date: String },

    // Internal consistency errors
    #[error("Unknown vehicle class: {0}")]
    UnknownVehicleClass(String),

    // Validation errors
    #[error("Validation failed: {} errors", .0.len())]
    ValidationFailed(Vec<ValidationError>),

    #[error("Driver id {0} is already registered")]
    DuplicateDriver(u32),

    // Configuration and I/O errors
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

// Convenience type alias for Results
pub type RideResult<T> = Result<T, RideError>;

// Helper functions for creating common errors
impl RideError {
    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        RideError::ValidationFailed(vec![ValidationError {
            field: field.into(),
            message: message.into(),
        }])
    }

    pub fn location_not_found(field: impl Into<String>, name: impl Into<String>) -> Self {
        RideError::LocationNotFound {
            field: field.into(),
            name: name.into(),
        }
    }

    pub fn ride_not_found(ride_id: impl Into<String>) -> Self {
        RideError::RideNotFound(ride_id.into())
    }

    pub fn configuration_error(msg: impl Into<String>) -> Self {
        RideError::ConfigurationError(msg.into())
    }

    /// Whether the caller can re-prompt or move on. Everything else points at
    /// broken configuration or an internal inconsistency.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            RideError::UnknownVehicleClass(_)
                | RideError::ConfigurationError(_)
                | RideError::Io(_)
                | RideError::Json(_)
        )
    }
}
