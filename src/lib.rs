pub mod errors;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use errors::{RideError, RideResult, ValidationError};
