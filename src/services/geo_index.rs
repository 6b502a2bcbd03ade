// src/services/geo_index.rs
use std::collections::{BTreeMap, HashMap};
use tracing;

use crate::models::location::{normalize_name, Location};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A location dropped at load time because its normalized name matched one
/// that was already loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateLocation {
    pub name: String,
    pub existing: String,
}

/// Read-only lookup table from location name to coordinates.
#[derive(Debug, Default)]
pub struct GeoIndex {
    locations: BTreeMap<String, Location>,
    // normalized key -> canonical name
    normalized: HashMap<String, String>,
}

impl GeoIndex {
    /// Build the index, keeping the first location for every normalized name.
    /// Later collisions are skipped and returned so the caller can surface them.
    pub fn from_locations(
        locations: impl IntoIterator<Item = Location>,
    ) -> (Self, Vec<DuplicateLocation>) {
        let mut index = GeoIndex::default();
        let mut skipped = Vec::new();

        for location in locations {
            let key = location.normalized_name();
            if let Some(existing) = index.normalized.get(&key) {
                tracing::warn!(
                    "Duplicate location skipped: {} (similar to {})",
                    location.name,
                    existing
                );
                skipped.push(DuplicateLocation {
                    name: location.name,
                    existing: existing.clone(),
                });
                continue;
            }
            index.normalized.insert(key, location.name.clone());
            index.locations.insert(location.name.clone(), location);
        }

        tracing::debug!(
            "Geo index loaded: {} locations, {} duplicates skipped",
            index.locations.len(),
            skipped.len()
        );
        (index, skipped)
    }

    /// Resolve user input to a known location. Precedence: exact name, then
    /// the whitespace-trimmed name, then the normalized key.
    pub fn resolve(&self, typed: &str) -> Option<&Location> {
        if let Some(location) = self.locations.get(typed) {
            return Some(location);
        }

        if let Some(location) = self.locations.get(typed.trim()) {
            return Some(location);
        }

        let key = normalize_name(typed);
        if key.is_empty() {
            return None;
        }
        self.normalized
            .get(&key)
            .and_then(|name| self.locations.get(name))
    }

    /// Haversine distance in kilometres.
    pub fn distance_km(&self, a: &Location, b: &Location) -> f64 {
        haversine_km(a.latitude, a.longitude, b.latitude, b.longitude)
    }

    /// Names containing the typed text, raw or normalized. Used to re-prompt
    /// after a failed lookup.
    pub fn suggestions(&self, typed: &str) -> Vec<&str> {
        let trimmed = typed.trim();
        let key = normalize_name(typed);
        if trimmed.is_empty() && key.is_empty() {
            return Vec::new();
        }

        self.locations
            .values()
            .filter(|location| {
                (!trimmed.is_empty() && location.name.contains(trimmed))
                    || (!key.is_empty() && location.normalized_name().contains(&key))
            })
            .map(|location| location.name.as_str())
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.locations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
