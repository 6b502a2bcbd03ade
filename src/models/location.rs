// src/models/location.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// Comparison key used for uniqueness and fuzzy lookup.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Lower-cases and keeps only alphanumeric characters: "Quezon City" and
/// "quezon-city" share the key "quezoncity".
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
