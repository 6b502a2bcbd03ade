// src/state.rs
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::{
    errors::{RideError, RideResult},
    models::{driver::DriverRegistration, location::Location, vehicle::VehicleClass},
    services::{
        fare_schedule::{FareEntry, FareSchedule},
        fleet_registry::FleetRegistry,
        geo_index::{DuplicateLocation, GeoIndex},
        ride_ledger::RideLedger,
    },
};

pub const CONFIG_ENV: &str = "GALAXY_RIDE_CONFIG";

pub struct AppState {
    pub geo: Arc<GeoIndex>,
    pub fares: Arc<FareSchedule>,
    pub fleet: FleetRegistry,
    pub ledger: RideLedger,
    pub skipped_locations: Vec<DuplicateLocation>,
    pub config: AppConfig,
}

/// Engine configuration. Sections left out of a config file keep their
/// built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub locations: Vec<Location>,
    pub drivers: Vec<DriverRegistration>,
    pub fares: Vec<FareEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let locations = vec![
            Location::new("Manila", 14.5995, 120.9842),
            Location::new("Quezon City", 14.6760, 121.0437),
            Location::new("Makati", 14.5547, 121.0244),
            Location::new("Pasig", 14.5764, 121.0851),
            Location::new("Taguig", 14.5176, 121.0509),
            Location::new("Pasay", 14.5378, 121.0014),
            Location::new("Caloocan", 14.6507, 120.9668),
            Location::new("Mandaluyong", 14.5794, 121.0359),
        ];

        let drivers = vec![
            DriverRegistration::new(1, "Sergio Dela Cruz", "09409798726", VehicleClass::Sedan),
            DriverRegistration::new(2, "Harold Salazar", "09669458580", VehicleClass::Suv),
            DriverRegistration::new(3, "Jerome Gonzales", "09403210927", VehicleClass::Sedan),
            DriverRegistration::new(4, "Jessie Torres", "09547689400", VehicleClass::Truck),
            DriverRegistration::new(5, "Wilson Roxas", "09387398460", VehicleClass::Van),
            DriverRegistration::new(6, "Victor Fernandez", "09547689400", VehicleClass::Motorcycle),
            DriverRegistration::new(7, "Arnold Aguilar", "09483490869", VehicleClass::Bus),
        ];

        let standard = FareSchedule::standard();
        let fares = VehicleClass::ALL
            .into_iter()
            .filter_map(|vehicle_class| {
                standard
                    .rate(vehicle_class)
                    .ok()
                    .map(|rate| FareEntry { vehicle_class, rate })
            })
            .collect();

        Self {
            locations,
            drivers,
            fares,
        }
    }
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> RideResult<Self> {
        let path = path.as_ref();
        tracing::info!("Loading configuration from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Config file named by `GALAXY_RIDE_CONFIG`, or the defaults.
    pub fn from_env() -> RideResult<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()),
            _ => {
                tracing::info!("{} not set, using built-in configuration", CONFIG_ENV);
                Ok(Self::default())
            }
        }
    }
}

impl AppState {
    pub fn new(config: AppConfig) -> RideResult<Self> {
        if config.locations.is_empty() {
            return Err(RideError::configuration_error("no locations configured"));
        }

        let (geo, skipped_locations) = GeoIndex::from_locations(config.locations.clone());
        let geo = Arc::new(geo);
        let fares = Arc::new(FareSchedule::from_entries(config.fares.iter().copied())?);
        let fleet = FleetRegistry::with_drivers(config.drivers.clone())?;
        let ledger = RideLedger::new(geo.clone(), fares.clone());

        tracing::info!(
            "Engine ready: {} locations, {} drivers",
            geo.len(),
            fleet.drivers().len()
        );

        Ok(Self {
            geo,
            fares,
            fleet,
            ledger,
            skipped_locations,
            config,
        })
    }
}
