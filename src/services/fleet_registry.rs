// src/services/fleet_registry.rs
use tracing;

use crate::{
    errors::{RideError, RideResult},
    models::{
        driver::{Driver, DriverId, DriverRegistration},
        vehicle::VehicleClass,
    },
};

pub trait FleetOperations {
    /// Take the first available driver of `vehicle_class` in registration
    /// order. `None` is a normal outcome: the ride goes ahead unassigned.
    fn allocate(&mut self, vehicle_class: VehicleClass) -> Option<DriverId>;

    /// Put a driver back in the pool. Unknown or already available ids are
    /// ignored so release paths can be repeated safely.
    fn release(&mut self, driver_id: DriverId);

    fn list_available(&self) -> Vec<&Driver>;

    fn driver(&self, driver_id: DriverId) -> Option<&Driver>;
}

/// Owns every driver and their availability.
#[derive(Debug, Default)]
pub struct FleetRegistry {
    drivers: Vec<Driver>,
}

impl FleetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drivers(
        registrations: impl IntoIterator<Item = DriverRegistration>,
    ) -> RideResult<Self> {
        let mut fleet = Self::new();
        for registration in registrations {
            fleet.register(registration)?;
        }
        Ok(fleet)
    }

    pub fn register(&mut self, registration: DriverRegistration) -> RideResult<()> {
        if self.drivers.iter().any(|d| d.id == registration.id) {
            return Err(RideError::DuplicateDriver(registration.id));
        }

        tracing::info!(
            "Registering driver {} ({}) for {}",
            registration.id,
            registration.name.trim(),
            registration.vehicle_class
        );
        self.drivers.push(Driver::new(registration));
        Ok(())
    }

    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    pub fn busy_count(&self) -> usize {
        self.drivers.iter().filter(|d| !d.available).count()
    }
}

impl FleetOperations for FleetRegistry {
    fn allocate(&mut self, vehicle_class: VehicleClass) -> Option<DriverId> {
        let driver = self
            .drivers
            .iter_mut()
            .find(|d| d.available && d.vehicle_class == vehicle_class)?;

        driver.available = false;
        tracing::info!("Allocated driver {} ({}) for {}", driver.id, driver.name, vehicle_class);
        Some(driver.id)
    }

    fn release(&mut self, driver_id: DriverId) {
        match self.drivers.iter_mut().find(|d| d.id == driver_id) {
            Some(driver) if !driver.available => {
                driver.available = true;
                tracing::info!("Released driver {} ({})", driver.id, driver.name);
            }
            Some(_) => tracing::debug!("Driver {} already available", driver_id),
            None => tracing::debug!("Release of unknown driver {} ignored", driver_id),
        }
    }

    fn list_available(&self) -> Vec<&Driver> {
        self.drivers.iter().filter(|d| d.available).collect()
    }

    fn driver(&self, driver_id: DriverId) -> Option<&Driver> {
        self.drivers.iter().find(|d| d.id == driver_id)
    }
}
