// src/models/ride.rs
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::driver::DriverId;
use super::vehicle::VehicleClass;
use crate::errors::{RideError, RideResult};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RideStatus {
    Pending,   // Booked, editable, driver possibly assigned
    Confirmed, // Fare fixed, waiting for dispatch
    Cancelled, // Terminal, driver released
    Completed, // Terminal, dispatched
}

/// Operations that move (or try to move) a ride through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RideAction {
    Confirm,
    Cancel,
    Complete,
    Edit,
}

impl RideStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RideStatus::Cancelled | RideStatus::Completed)
    }

    /// Pending and Confirmed rides hold their driver.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// The whole transition table. `None` means the action is illegal from
    /// this status.
    pub fn next(self, action: RideAction) -> Option<RideStatus> {
        use RideAction::*;
        use RideStatus::*;

        match (self, action) {
            (Pending, Confirm) => Some(Confirmed),
            (Pending, Edit) => Some(Pending),
            (Pending | Confirmed, Cancel) => Some(Cancelled),
            (Pending | Confirmed, Complete) => Some(Completed),
            _ => None,
        }
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RideStatus::Pending => "Pending",
            RideStatus::Confirmed => "Confirmed",
            RideStatus::Cancelled => "Cancelled",
            RideStatus::Completed => "Completed",
        };
        f.write_str(label)
    }
}

impl RideAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideAction::Confirm => "confirm",
            RideAction::Cancel => "cancel",
            RideAction::Complete => "complete",
            RideAction::Edit => "edit",
        }
    }
}

/// Calendar date of a ride. The date picker hands these over already
/// validated, so no calendar checks happen here.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RideDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl RideDate {
    pub fn new(day: u32, month: u32, year: i32) -> Self {
        Self { year, month, day }
    }

    /// Current UTC date, the same clock ride ids and timestamps use.
    pub fn today() -> Self {
        Utc::now().into()
    }
}

impl From<DateTime<Utc>> for RideDate {
    fn from(timestamp: DateTime<Utc>) -> Self {
        timestamp.date_naive().into()
    }
}

impl From<NaiveDate> for RideDate {
    fn from(date: NaiveDate) -> Self {
        Self::new(date.day(), date.month(), date.year())
    }
}

impl fmt::Display for RideDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{}", self.month, self.day, self.year)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PassengerInfo {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RideRequest {
    pub passenger: PassengerInfo,
    pub pickup: String,
    pub dropoff: String,
    pub vehicle_class: VehicleClass,
    pub date: RideDate,
    #[serde(default = "default_passenger_count")]
    pub passenger_count: u32,
}

fn default_passenger_count() -> u32 {
    1
}

/// A single-field change to a pending ride.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum RideEdit {
    Phone(String),
    Pickup(String),
    Dropoff(String),
    Date(RideDate),
    VehicleClass(VehicleClass),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Ride {
    pub ride_id: String,
    pub passenger_count: u32,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,

    // Canonical location names as resolved by the geo index
    pub pickup: String,
    pub dropoff: String,
    pub distance_km: f64,

    pub ride_date: RideDate,
    pub vehicle_class: VehicleClass,
    pub status: RideStatus,
    pub assigned_driver_id: Option<DriverId>,
    pub fare: Option<f64>, // Set on confirmation

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ride {
    /// Status this ride would move to under `action`, or the error that
    /// explains why it cannot.
    pub fn transition(&self, action: RideAction) -> RideResult<RideStatus> {
        if let Some(next) = self.status.next(action) {
            return Ok(next);
        }

        Err(match (self.status, action) {
            (RideStatus::Cancelled, RideAction::Cancel) => {
                RideError::AlreadyCancelled(self.ride_id.clone())
            }
            (RideStatus::Completed, RideAction::Cancel) => RideError::RideAlreadyTerminal {
                ride_id: self.ride_id.clone(),
                status: self.status,
            },
            (from, action) => RideError::InvalidTransition {
                ride_id: self.ride_id.clone(),
                from,
                action: action.as_str(),
            },
        })
    }

    pub fn holds_driver(&self) -> bool {
        self.status.is_active() && self.assigned_driver_id.is_some()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
