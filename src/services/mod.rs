// src/services/mod.rs
pub mod fare_schedule;
pub mod fleet_registry;
pub mod geo_index;
pub mod ride_grouper;
pub mod ride_ledger;

pub use fare_schedule::{FareEntry, FareRate, FareSchedule};
pub use fleet_registry::{FleetOperations, FleetRegistry};
pub use geo_index::{DuplicateLocation, GeoIndex};
pub use ride_grouper::{BatchKey, BatchSignature, RideBatch, RideGrouper};
pub use ride_ledger::{BookingBatch, DispatchFailure, DispatchSummary, RideLedger};
