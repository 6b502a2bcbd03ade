// src/models/vehicle.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::RideError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VehicleClass {
    Sedan,
    #[serde(rename = "SUV")]
    Suv,
    Truck,
    Van,
    Motorcycle,
    Bus,
    Train,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 7] = [
        VehicleClass::Sedan,
        VehicleClass::Suv,
        VehicleClass::Truck,
        VehicleClass::Van,
        VehicleClass::Motorcycle,
        VehicleClass::Bus,
        VehicleClass::Train,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Sedan => "Sedan",
            VehicleClass::Suv => "SUV",
            VehicleClass::Truck => "Truck",
            VehicleClass::Van => "Van",
            VehicleClass::Motorcycle => "Motorcycle",
            VehicleClass::Bus => "Bus",
            VehicleClass::Train => "Train",
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VehicleClass {
    type Err = RideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        VehicleClass::ALL
            .into_iter()
            .find(|class| class.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RideError::UnknownVehicleClass(wanted.to_string()))
    }
}
