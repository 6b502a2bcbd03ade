// src/services/fare_schedule.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    errors::{RideError, RideResult},
    models::vehicle::VehicleClass,
};

pub const CURRENCY: &str = "PHP";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct FareRate {
    pub base_fare: f64,
    pub per_km_rate: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct FareEntry {
    pub vehicle_class: VehicleClass,
    #[serde(flatten)]
    pub rate: FareRate,
}

/// Static vehicle class -> (base fare, per-km rate) table.
#[derive(Debug, Clone)]
pub struct FareSchedule {
    rates: HashMap<VehicleClass, FareRate>,
}

impl FareSchedule {
    /// The standard Metro Manila table.
    pub fn standard() -> Self {
        let table = [
            (VehicleClass::Sedan, 40.0, 15.0),
            (VehicleClass::Suv, 60.0, 20.0),
            (VehicleClass::Truck, 100.0, 30.0),
            (VehicleClass::Van, 80.0, 18.0),
            (VehicleClass::Motorcycle, 30.0, 10.0),
            (VehicleClass::Bus, 150.0, 8.0),
            (VehicleClass::Train, 15.0, 2.0),
        ];

        Self {
            rates: table
                .into_iter()
                .map(|(class, base_fare, per_km_rate)| {
                    (class, FareRate { base_fare, per_km_rate })
                })
                .collect(),
        }
    }

    /// Build a schedule from explicit entries layered over the standard
    /// table, so every vehicle class stays priced. Rates must be finite and
    /// non-negative; later entries for the same class replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = FareEntry>) -> RideResult<Self> {
        let mut rates = Self::standard().rates;
        let mut overridden = 0;
        for entry in entries {
            let FareRate { base_fare, per_km_rate } = entry.rate;
            let valid = |v: f64| v.is_finite() && v >= 0.0;
            if !valid(base_fare) || !valid(per_km_rate) {
                return Err(RideError::configuration_error(format!(
                    "fare for {} must be non-negative (base {}, per km {})",
                    entry.vehicle_class, base_fare, per_km_rate
                )));
            }
            rates.insert(entry.vehicle_class, entry.rate);
            overridden += 1;
        }

        tracing::debug!(
            "Fare schedule loaded: {} configured entries, {} classes priced",
            overridden,
            rates.len()
        );
        Ok(Self { rates })
    }

    #[cfg(test)]
    pub(crate) fn with_only(entries: &[(VehicleClass, f64, f64)]) -> Self {
        Self {
            rates: entries
                .iter()
                .map(|&(class, base_fare, per_km_rate)| {
                    (class, FareRate { base_fare, per_km_rate })
                })
                .collect(),
        }
    }

    pub fn rate(&self, vehicle_class: VehicleClass) -> RideResult<FareRate> {
        self.rates
            .get(&vehicle_class)
            .copied()
            .ok_or_else(|| RideError::UnknownVehicleClass(vehicle_class.to_string()))
    }

    /// `base_fare + per_km_rate * distance_km`
    pub fn quote(&self, vehicle_class: VehicleClass, distance_km: f64) -> RideResult<f64> {
        let rate = self.rate(vehicle_class)?;
        Ok(rate.base_fare + rate.per_km_rate * distance_km)
    }
}

impl Default for FareSchedule {
    fn default() -> Self {
        Self::standard()
    }
}
