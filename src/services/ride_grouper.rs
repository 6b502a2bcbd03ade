// src/services/ride_grouper.rs
//! Batching of confirmed rides for shared dispatch, plus the read-only
//! duplicate-batch statistic used in session summaries.

use serde::Serialize;
use std::collections::HashMap;

use crate::models::{
    ride::{Ride, RideDate, RideStatus},
    vehicle::VehicleClass,
};

/// Rides in one batch share all of these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BatchKey {
    pub vehicle_class: VehicleClass,
    pub date: RideDate,
    pub pickup: String,
    pub dropoff: String,
}

#[derive(Debug, Serialize)]
pub struct RideBatch<'a> {
    pub key: BatchKey,
    pub rides: Vec<&'a Ride>,
}

/// Vehicle classes of one booking batch, in booking order.
pub type BatchSignature = Vec<VehicleClass>;

impl BatchKey {
    pub fn of(ride: &Ride) -> Self {
        Self {
            vehicle_class: ride.vehicle_class,
            date: ride.ride_date,
            pickup: ride.pickup.clone(),
            dropoff: ride.dropoff.clone(),
        }
    }
}

impl RideBatch<'_> {
    pub fn passenger_total(&self) -> u32 {
        self.rides.iter().map(|r| r.passenger_count).sum()
    }
}

pub struct RideGrouper;

impl RideGrouper {
    /// Partition confirmed rides by (vehicle, date, pickup, dropoff). Batches
    /// come out in the order their first ride was seen, and rides keep their
    /// order within a batch.
    pub fn group_active<'a>(rides: impl IntoIterator<Item = &'a Ride>) -> Vec<RideBatch<'a>> {
        let mut batches: Vec<RideBatch<'a>> = Vec::new();
        let mut positions: HashMap<BatchKey, usize> = HashMap::new();

        for ride in rides {
            if ride.status != RideStatus::Confirmed {
                continue;
            }

            let key = BatchKey::of(ride);
            match positions.get(&key) {
                Some(&idx) => batches[idx].rides.push(ride),
                None => {
                    positions.insert(key.clone(), batches.len());
                    batches.push(RideBatch {
                        key,
                        rides: vec![ride],
                    });
                }
            }
        }

        tracing::debug!("Grouped confirmed rides into {} batches", batches.len());
        batches
    }

    /// Number of signatures that repeat an earlier one. Three identical and
    /// two identical signatures give 2 + 1 = 3.
    pub fn count_duplicate_batches(signatures: &[BatchSignature]) -> usize {
        let mut seen: HashMap<&BatchSignature, usize> = HashMap::new();
        for signature in signatures {
            *seen.entry(signature).or_insert(0) += 1;
        }
        seen.values().map(|count| count - 1).sum()
    }

    pub fn is_scheduled_today(ride: &Ride, today: RideDate) -> bool {
        ride.ride_date == today
    }
}
