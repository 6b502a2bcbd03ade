// src/models/driver.rs
use serde::{Deserialize, Serialize};

use super::vehicle::VehicleClass;

pub type DriverId = u32;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Driver {
    pub id: DriverId,           // Externally assigned, unique within the fleet
    pub name: String,
    pub phone: String,
    pub vehicle_class: VehicleClass,
    pub available: bool,        // Only the fleet registry flips this
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DriverRegistration {
    pub id: DriverId,
    pub name: String,
    pub phone: String,
    pub vehicle_class: VehicleClass,
}

impl Driver {
    pub fn new(registration: DriverRegistration) -> Self {
        Self {
            id: registration.id,
            name: registration.name.trim().to_string(),
            phone: registration.phone.trim().to_string(),
            vehicle_class: registration.vehicle_class,
            available: true,
        }
    }
}

impl DriverRegistration {
    pub fn new(
        id: DriverId,
        name: impl Into<String>,
        phone: impl Into<String>,
        vehicle_class: VehicleClass,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            phone: phone.into(),
            vehicle_class,
        }
    }
}
