// src/services/ride_ledger.rs
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing;

use crate::{
    errors::{RideError, RideResult},
    models::{
        location::Location,
        ride::{Ride, RideAction, RideDate, RideEdit, RideRequest, RideStatus},
    },
    services::{
        fare_schedule::FareSchedule,
        fleet_registry::FleetOperations,
        geo_index::GeoIndex,
        ride_grouper::{BatchSignature, RideGrouper},
    },
    utils::id_generator::RideIdGenerator,
};

/// Rides created together by one booking, with the vehicle-assignment
/// signature used for duplicate-batch reporting.
#[derive(Debug, Clone)]
pub struct BookingBatch {
    pub rides: Vec<Ride>,
    pub signature: BatchSignature,
}

/// A ride the dispatch sweep could not complete.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DispatchFailure {
    pub ride_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchSummary {
    pub completed: Vec<String>,
    pub failed: Vec<DispatchFailure>,
}

// A request whose locations have been resolved and checked.
struct ResolvedRoute {
    pickup: String,
    dropoff: String,
    distance_km: f64,
}

/// Owns every ride record, in booking order, and enforces the ride
/// lifecycle. Operations that touch driver availability take the fleet as a
/// parameter.
pub struct RideLedger {
    rides: Vec<Ride>,
    ids: RideIdGenerator,
    geo: Arc<GeoIndex>,
    fares: Arc<FareSchedule>,
}

impl RideLedger {
    pub fn new(geo: Arc<GeoIndex>, fares: Arc<FareSchedule>) -> Self {
        Self {
            rides: Vec::new(),
            ids: RideIdGenerator::new(),
            geo,
            fares,
        }
    }

    fn resolve(&self, field: &str, typed: &str) -> RideResult<&Location> {
        self.geo.resolve(typed).ok_or_else(|| {
            tracing::debug!("No location matches {} '{}'", field, typed);
            RideError::location_not_found(field, typed)
        })
    }

    fn resolve_route(&self, pickup: &str, dropoff: &str) -> RideResult<ResolvedRoute> {
        let from = self.resolve("pickup", pickup)?;
        let to = self.resolve("dropoff", dropoff)?;
        if from.name == to.name {
            return Err(RideError::validation_error(
                "dropoff",
                "Dropoff cannot be the same as pickup",
            ));
        }

        Ok(ResolvedRoute {
            pickup: from.name.clone(),
            dropoff: to.name.clone(),
            distance_km: self.geo.distance_km(from, to),
        })
    }

    fn validate_request(&self, request: &RideRequest) -> RideResult<ResolvedRoute> {
        if request.passenger_count == 0 {
            return Err(RideError::validation_error(
                "passenger_count",
                "At least one passenger is required",
            ));
        }
        self.resolve_route(&request.pickup, &request.dropoff)
    }

    fn position(&self, ride_id: &str) -> RideResult<usize> {
        self.rides
            .iter()
            .position(|r| r.ride_id == ride_id)
            .ok_or_else(|| RideError::ride_not_found(ride_id))
    }

    fn quote_fare(&self, ride: &Ride) -> RideResult<f64> {
        // Locations are immutable, so this matches the distance seen at booking
        let route = self.resolve_route(&ride.pickup, &ride.dropoff)?;
        self.fares.quote(ride.vehicle_class, route.distance_km)
    }

    fn insert(
        &mut self,
        fleet: &mut impl FleetOperations,
        request: RideRequest,
        route: ResolvedRoute,
    ) -> Ride {
        let assigned_driver_id = fleet.allocate(request.vehicle_class);
        if assigned_driver_id.is_none() {
            tracing::warn!(
                "No {} driver available; booking {} {} without a driver",
                request.vehicle_class,
                request.passenger.first_name,
                request.passenger.last_name
            );
        }

        let now = Utc::now();
        let ride = Ride {
            ride_id: self.ids.generate_with_timestamp(now),
            passenger_count: request.passenger_count,
            first_name: request.passenger.first_name,
            last_name: request.passenger.last_name,
            phone: request.passenger.phone,
            pickup: route.pickup,
            dropoff: route.dropoff,
            distance_km: route.distance_km,
            ride_date: request.date,
            vehicle_class: request.vehicle_class,
            status: RideStatus::Pending,
            assigned_driver_id,
            fare: None,
            created_at: now,
            updated_at: now,
        };

        tracing::info!(
            "Ride created: {} {} -> {} ({:.2} km, {})",
            ride.ride_id,
            ride.pickup,
            ride.dropoff,
            ride.distance_km,
            ride.vehicle_class
        );
        self.rides.push(ride.clone());
        ride
    }

    pub fn create(
        &mut self,
        fleet: &mut impl FleetOperations,
        request: RideRequest,
    ) -> RideResult<Ride> {
        let route = self.validate_request(&request)?;
        Ok(self.insert(fleet, request, route))
    }

    /// Book one ride per request. Every request is validated before any
    /// driver is allocated, so a bad entry leaves the ledger untouched.
    pub fn create_batch(
        &mut self,
        fleet: &mut impl FleetOperations,
        requests: Vec<RideRequest>,
    ) -> RideResult<BookingBatch> {
        if requests.is_empty() {
            return Err(RideError::validation_error("passengers", "Booking has no passengers"));
        }

        let routes = requests
            .iter()
            .map(|request| self.validate_request(request))
            .collect::<RideResult<Vec<_>>>()?;

        let passenger_count = requests.len() as u32;
        let mut rides = Vec::with_capacity(requests.len());
        for (mut request, route) in requests.into_iter().zip(routes) {
            request.passenger_count = passenger_count;
            rides.push(self.insert(fleet, request, route));
        }

        let signature = rides.iter().map(|r| r.vehicle_class).collect();
        Ok(BookingBatch { rides, signature })
    }

    pub fn get(&self, ride_id: &str) -> Option<&Ride> {
        self.rides.iter().find(|r| r.ride_id == ride_id)
    }

    pub fn rides(&self) -> &[Ride] {
        &self.rides
    }

    pub fn len(&self) -> usize {
        self.rides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rides.is_empty()
    }

    /// Exact ride id first; otherwise every ride whose first, last or full
    /// name contains the query, ignoring case. No match is an empty result.
    pub fn find(&self, query: &str) -> Vec<&Ride> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        if let Some(ride) = self.get(query) {
            return vec![ride];
        }

        let needle = query.to_lowercase();
        let matches: Vec<&Ride> = self
            .rides
            .iter()
            .filter(|r| {
                r.first_name.to_lowercase().contains(&needle)
                    || r.last_name.to_lowercase().contains(&needle)
                    || r.full_name().to_lowercase().contains(&needle)
            })
            .collect();

        tracing::debug!("Search '{}' matched {} rides", query, matches.len());
        matches
    }

    pub fn confirm(&mut self, ride_id: &str) -> RideResult<Ride> {
        let idx = self.position(ride_id)?;
        let next = self.rides[idx].transition(RideAction::Confirm)?;
        let fare = self.quote_fare(&self.rides[idx])?;

        let ride = &mut self.rides[idx];
        ride.fare = Some(fare);
        ride.status = next;
        ride.updated_at = Utc::now();

        tracing::info!("Ride confirmed: {} - {:.2}", ride.ride_id, fare);
        Ok(ride.clone())
    }

    pub fn cancel(
        &mut self,
        fleet: &mut impl FleetOperations,
        ride_id: &str,
    ) -> RideResult<Ride> {
        let idx = self.position(ride_id)?;
        let ride = &mut self.rides[idx];
        let next = ride.transition(RideAction::Cancel)?;

        if let Some(driver_id) = ride.assigned_driver_id {
            fleet.release(driver_id);
        }
        ride.status = next;
        ride.updated_at = Utc::now();

        tracing::info!("Ride cancelled: {}", ride.ride_id);
        Ok(ride.clone())
    }

    /// Finish a ride scheduled for `today`. A pending ride gets its fare on
    /// the way through. The driver goes back to the pool; the ride keeps the
    /// id for history.
    pub fn complete(
        &mut self,
        fleet: &mut impl FleetOperations,
        ride_id: &str,
        today: RideDate,
    ) -> RideResult<Ride> {
        let idx = self.position(ride_id)?;
        let current = &self.rides[idx];
        let next = current.transition(RideAction::Complete)?;
        if !RideGrouper::is_scheduled_today(current, today) {
            return Err(RideError::NotDueToday {
                ride_id: current.ride_id.clone(),
                date: current.ride_date.to_string(),
            });
        }

        let fare = match current.fare {
            Some(fare) => fare,
            None => self.quote_fare(current)?,
        };

        let ride = &mut self.rides[idx];
        if let Some(driver_id) = ride.assigned_driver_id {
            fleet.release(driver_id);
        }
        ride.fare = Some(fare);
        ride.status = next;
        ride.updated_at = Utc::now();

        tracing::info!("Ride completed: {}", ride.ride_id);
        Ok(ride.clone())
    }

    /// Complete every pending or confirmed ride scheduled for `today`, in
    /// booking order. A ride that fails is reported and left as it was; the
    /// sweep carries on with the rest.
    pub fn dispatch_due(
        &mut self,
        fleet: &mut impl FleetOperations,
        today: RideDate,
    ) -> DispatchSummary {
        let due: Vec<String> = self
            .rides
            .iter()
            .filter(|r| r.status.is_active() && RideGrouper::is_scheduled_today(r, today))
            .map(|r| r.ride_id.clone())
            .collect();

        if due.is_empty() {
            tracing::info!("No rides scheduled for {}", today);
        }

        let mut summary = DispatchSummary::default();
        for ride_id in due {
            match self.complete(fleet, &ride_id, today) {
                Ok(_) => summary.completed.push(ride_id),
                Err(err) => {
                    tracing::warn!("Dispatch failed for {}: {}", ride_id, err);
                    summary.failed.push(DispatchFailure {
                        ride_id,
                        reason: err.to_string(),
                    });
                }
            }
        }
        summary
    }

    /// Change one field of a pending ride. Changing the vehicle class hands
    /// the current driver back and looks for one of the new class.
    pub fn edit(
        &mut self,
        fleet: &mut impl FleetOperations,
        ride_id: &str,
        edit: RideEdit,
    ) -> RideResult<Ride> {
        let idx = self.position(ride_id)?;
        let current = &self.rides[idx];
        current.transition(RideAction::Edit)?;

        let route = match &edit {
            RideEdit::Pickup(name) => Some(self.resolve_route(name, &current.dropoff)?),
            RideEdit::Dropoff(name) => Some(self.resolve_route(&current.pickup, name)?),
            _ => None,
        };

        let ride = &mut self.rides[idx];
        match edit {
            RideEdit::Phone(phone) => ride.phone = phone.trim().to_string(),
            RideEdit::Pickup(_) | RideEdit::Dropoff(_) => {
                if let Some(route) = route {
                    ride.pickup = route.pickup;
                    ride.dropoff = route.dropoff;
                    ride.distance_km = route.distance_km;
                }
            }
            RideEdit::Date(date) => ride.ride_date = date,
            RideEdit::VehicleClass(vehicle_class) => {
                if vehicle_class != ride.vehicle_class {
                    if let Some(driver_id) = ride.assigned_driver_id.take() {
                        fleet.release(driver_id);
                    }
                    ride.vehicle_class = vehicle_class;
                    ride.assigned_driver_id = fleet.allocate(vehicle_class);
                }
            }
        }
        ride.updated_at = Utc::now();

        tracing::info!("Ride edited: {}", ride.ride_id);
        Ok(ride.clone())
    }

    /// Remove a ride outright, whatever its status. A driver still held by
    /// the ride goes back to the pool.
    pub fn delete(
        &mut self,
        fleet: &mut impl FleetOperations,
        ride_id: &str,
    ) -> RideResult<Ride> {
        let idx = self.position(ride_id)?;
        let ride = self.rides.remove(idx);
        if ride.holds_driver() {
            if let Some(driver_id) = ride.assigned_driver_id {
                fleet.release(driver_id);
            }
        }

        tracing::info!("Ride deleted: {} ({})", ride.ride_id, ride.status);
        Ok(ride)
    }

    /// Rides that currently hold a driver.
    pub fn active_assignments(&self) -> usize {
        self.rides.iter().filter(|r| r.holds_driver()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        driver::DriverRegistration, location::Location, ride::PassengerInfo,
        vehicle::VehicleClass,
    };
    use crate::services::fleet_registry::FleetRegistry;

    const TODAY: RideDate = RideDate { year: 2026, month: 10, day: 16 };

    fn geo() -> Arc<GeoIndex> {
        let (index, _) = GeoIndex::from_locations(vec![
            Location::new("Manila", 14.5995, 120.9842),
            Location::new("Quezon City", 14.6760, 121.0437),
            Location::new("Makati", 14.5547, 121.0244),
        ]);
        Arc::new(index)
    }

    fn setup() -> (RideLedger, FleetRegistry) {
        let ledger = RideLedger::new(geo(), Arc::new(FareSchedule::standard()));
        let fleet = FleetRegistry::with_drivers(vec![
            DriverRegistration::new(1, "Sergio Dela Cruz", "09409798726", VehicleClass::Sedan),
            DriverRegistration::new(2, "Harold Salazar", "09669458580", VehicleClass::Suv),
        ])
        .unwrap();
        (ledger, fleet)
    }

    fn request(first: &str, pickup: &str, dropoff: &str, class: VehicleClass) -> RideRequest {
        RideRequest {
            passenger: PassengerInfo {
                first_name: first.to_string(),
                last_name: "Santos".to_string(),
                phone: "09170000000".to_string(),
            },
            pickup: pickup.to_string(),
            dropoff: dropoff.to_string(),
            vehicle_class: class,
            date: TODAY,
            passenger_count: 1,
        }
    }

    fn assert_occupancy(ledger: &RideLedger, fleet: &FleetRegistry) {
        assert_eq!(fleet.busy_count(), ledger.active_assignments());
    }

    #[test]
    fn sedan_fare_is_base_plus_rate_times_distance() {
        let (mut ledger, mut fleet) = setup();
        let ride = ledger
            .create(&mut fleet, request("Maria", "Manila", "Quezon City", VehicleClass::Sedan))
            .unwrap();
        assert_eq!(ride.status, RideStatus::Pending);
        assert_eq!(ride.fare, None);

        let confirmed = ledger.confirm(&ride.ride_id).unwrap();
        let geo = geo();
        let distance = geo.distance_km(
            geo.resolve("Manila").unwrap(),
            geo.resolve("Quezon City").unwrap(),
        );
        assert_eq!(confirmed.status, RideStatus::Confirmed);
        assert_eq!(confirmed.fare, Some(40.0 + 15.0 * distance));
    }

    #[test]
    fn single_sedan_is_shared_out_one_ride_at_a_time() {
        let (mut ledger, mut fleet) = setup();
        let first = ledger
            .create(&mut fleet, request("A", "Manila", "Makati", VehicleClass::Sedan))
            .unwrap();
        let second = ledger
            .create(&mut fleet, request("B", "Manila", "Makati", VehicleClass::Sedan))
            .unwrap();
        assert_eq!(first.assigned_driver_id, Some(1));
        assert_eq!(second.assigned_driver_id, None);
        assert_occupancy(&ledger, &fleet);

        ledger.cancel(&mut fleet, &first.ride_id).unwrap();
        assert!(fleet.driver(1).unwrap().available);
        assert_occupancy(&ledger, &fleet);

        let third = ledger
            .create(&mut fleet, request("C", "Manila", "Makati", VehicleClass::Sedan))
            .unwrap();
        assert_eq!(third.assigned_driver_id, Some(1));
        assert_occupancy(&ledger, &fleet);
    }

    #[test]
    fn unknown_locations_name_the_field() {
        let (mut ledger, mut fleet) = setup();
        let err = ledger
            .create(&mut fleet, request("A", "Atlantis", "Makati", VehicleClass::Sedan))
            .unwrap_err();
        assert!(matches!(err, RideError::LocationNotFound { ref field, .. } if field == "pickup"));

        let err = ledger
            .create(&mut fleet, request("A", "Manila", "Lemuria", VehicleClass::Sedan))
            .unwrap_err();
        assert!(matches!(err, RideError::LocationNotFound { ref field, .. } if field == "dropoff"));
        assert!(ledger.is_empty());
        assert_eq!(fleet.busy_count(), 0);
    }

    #[test]
    fn pickup_and_dropoff_must_differ_after_resolution() {
        let (mut ledger, mut fleet) = setup();
        let err = ledger
            .create(&mut fleet, request("A", "Manila", " manila ", VehicleClass::Sedan))
            .unwrap_err();
        assert!(matches!(err, RideError::ValidationFailed(_)));
    }

    #[test]
    fn created_rides_store_canonical_names_and_unique_ids() {
        let (mut ledger, mut fleet) = setup();
        let a = ledger
            .create(&mut fleet, request("A", "quezon-city", " Makati", VehicleClass::Bus))
            .unwrap();
        let b = ledger
            .create(&mut fleet, request("B", "quezon-city", " Makati", VehicleClass::Bus))
            .unwrap();
        assert_eq!(a.pickup, "Quezon City");
        assert_eq!(a.dropoff, "Makati");
        assert_ne!(a.ride_id, b.ride_id);
        assert!(RideIdGenerator::validate_id(&a.ride_id));
    }

    #[test]
    fn cancel_and_terminal_states() {
        let (mut ledger, mut fleet) = setup();
        let ride = ledger
            .create(&mut fleet, request("A", "Manila", "Makati", VehicleClass::Suv))
            .unwrap();
        ledger.confirm(&ride.ride_id).unwrap();
        ledger.cancel(&mut fleet, &ride.ride_id).unwrap();
        assert!(fleet.driver(2).unwrap().available);

        assert!(matches!(
            ledger.cancel(&mut fleet, &ride.ride_id),
            Err(RideError::AlreadyCancelled(_))
        ));
        assert!(matches!(
            ledger.confirm(&ride.ride_id),
            Err(RideError::InvalidTransition { .. })
        ));
        assert!(matches!(
            ledger.complete(&mut fleet, &ride.ride_id, TODAY),
            Err(RideError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn completed_rides_cannot_be_cancelled() {
        let (mut ledger, mut fleet) = setup();
        let ride = ledger
            .create(&mut fleet, request("A", "Manila", "Makati", VehicleClass::Sedan))
            .unwrap();
        ledger.confirm(&ride.ride_id).unwrap();
        let done = ledger.complete(&mut fleet, &ride.ride_id, TODAY).unwrap();
        assert_eq!(done.status, RideStatus::Completed);
        assert_eq!(done.assigned_driver_id, Some(1));
        assert!(fleet.driver(1).unwrap().available);

        assert!(matches!(
            ledger.cancel(&mut fleet, &ride.ride_id),
            Err(RideError::RideAlreadyTerminal { .. })
        ));
        assert!(matches!(
            ledger.confirm(&ride.ride_id),
            Err(RideError::InvalidTransition { .. })
        ));
        assert_occupancy(&ledger, &fleet);
    }

    #[test]
    fn complete_requires_todays_date_and_prices_pending_rides() {
        let (mut ledger, mut fleet) = setup();
        let mut later = request("A", "Manila", "Makati", VehicleClass::Sedan);
        later.date = RideDate::new(20, 10, 2026);
        let later = ledger.create(&mut fleet, later).unwrap();
        assert!(matches!(
            ledger.complete(&mut fleet, &later.ride_id, TODAY),
            Err(RideError::NotDueToday { .. })
        ));

        let now = ledger
            .create(&mut fleet, request("B", "Manila", "Makati", VehicleClass::Suv))
            .unwrap();
        let done = ledger.complete(&mut fleet, &now.ride_id, TODAY).unwrap();
        assert!(done.fare.is_some());
    }

    #[test]
    fn edit_only_while_pending() {
        let (mut ledger, mut fleet) = setup();
        let ride = ledger
            .create(&mut fleet, request("A", "Manila", "Makati", VehicleClass::Sedan))
            .unwrap();
        let confirmed = ledger.confirm(&ride.ride_id).unwrap();

        let err = ledger
            .edit(&mut fleet, &ride.ride_id, RideEdit::Phone("0999".to_string()))
            .unwrap_err();
        assert!(matches!(err, RideError::InvalidTransition { action: "edit", .. }));
        let unchanged = ledger.get(&ride.ride_id).unwrap();
        assert_eq!(unchanged.phone, confirmed.phone);
        assert_eq!(unchanged.status, RideStatus::Confirmed);
    }

    #[test]
    fn edit_changes_only_the_requested_field() {
        let (mut ledger, mut fleet) = setup();
        let ride = ledger
            .create(&mut fleet, request("A", "Manila", "Makati", VehicleClass::Sedan))
            .unwrap();

        let edited = ledger
            .edit(&mut fleet, &ride.ride_id, RideEdit::Dropoff("quezon city".to_string()))
            .unwrap();
        assert_eq!(edited.dropoff, "Quezon City");
        assert_eq!(edited.pickup, "Manila");
        assert_eq!(edited.phone, ride.phone);
        assert!(edited.distance_km > ride.distance_km);

        let err = ledger
            .edit(&mut fleet, &ride.ride_id, RideEdit::Pickup("Quezon City".to_string()))
            .unwrap_err();
        assert!(matches!(err, RideError::ValidationFailed(_)));
        assert!(matches!(
            ledger.edit(&mut fleet, &ride.ride_id, RideEdit::Pickup("Nowhere".to_string())),
            Err(RideError::LocationNotFound { .. })
        ));

        let date = RideDate::new(1, 1, 2027);
        let edited = ledger.edit(&mut fleet, &ride.ride_id, RideEdit::Date(date)).unwrap();
        assert_eq!(edited.ride_date, date);
        assert_eq!(edited.dropoff, "Quezon City");
    }

    #[test]
    fn vehicle_class_edit_reallocates() {
        let (mut ledger, mut fleet) = setup();
        let ride = ledger
            .create(&mut fleet, request("A", "Manila", "Makati", VehicleClass::Sedan))
            .unwrap();
        assert_eq!(ride.assigned_driver_id, Some(1));

        let edited = ledger
            .edit(&mut fleet, &ride.ride_id, RideEdit::VehicleClass(VehicleClass::Suv))
            .unwrap();
        assert_eq!(edited.assigned_driver_id, Some(2));
        assert!(fleet.driver(1).unwrap().available);
        assert_occupancy(&ledger, &fleet);

        let edited = ledger
            .edit(&mut fleet, &ride.ride_id, RideEdit::VehicleClass(VehicleClass::Train))
            .unwrap();
        assert_eq!(edited.assigned_driver_id, None);
        assert_eq!(fleet.busy_count(), 0);
        assert_occupancy(&ledger, &fleet);
    }

    #[test]
    fn find_by_id_or_name() {
        let (mut ledger, mut fleet) = setup();
        let maria = ledger
            .create(&mut fleet, request("Maria", "Manila", "Makati", VehicleClass::Sedan))
            .unwrap();
        ledger
            .create(&mut fleet, request("Mario", "Manila", "Makati", VehicleClass::Van))
            .unwrap();

        assert_eq!(ledger.find(&maria.ride_id).len(), 1);
        assert_eq!(ledger.find("mari").len(), 2);
        assert_eq!(ledger.find("SANTOS").len(), 2);
        assert_eq!(ledger.find("maria santos").len(), 1);
        assert!(ledger.find("Juan").is_empty());
        assert!(ledger.find("   ").is_empty());
    }

    #[test]
    fn delete_removes_and_frees_held_driver() {
        let (mut ledger, mut fleet) = setup();
        let ride = ledger
            .create(&mut fleet, request("A", "Manila", "Makati", VehicleClass::Sedan))
            .unwrap();
        let removed = ledger.delete(&mut fleet, &ride.ride_id).unwrap();
        assert_eq!(removed.ride_id, ride.ride_id);
        assert!(ledger.get(&ride.ride_id).is_none());
        assert!(fleet.driver(1).unwrap().available);
        assert!(matches!(
            ledger.delete(&mut fleet, &ride.ride_id),
            Err(RideError::RideNotFound(_))
        ));
    }

    #[test]
    fn batch_booking_is_all_or_nothing() {
        let (mut ledger, mut fleet) = setup();
        let err = ledger
            .create_batch(
                &mut fleet,
                vec![
                    request("A", "Manila", "Makati", VehicleClass::Sedan),
                    request("B", "Manila", "Nowhere", VehicleClass::Suv),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, RideError::LocationNotFound { .. }));
        assert!(ledger.is_empty());
        assert_eq!(fleet.busy_count(), 0);

        let batch = ledger
            .create_batch(
                &mut fleet,
                vec![
                    request("A", "Manila", "Makati", VehicleClass::Sedan),
                    request("B", "Manila", "Makati", VehicleClass::Suv),
                ],
            )
            .unwrap();
        assert_eq!(batch.signature, vec![VehicleClass::Sedan, VehicleClass::Suv]);
        assert!(batch.rides.iter().all(|r| r.passenger_count == 2));
    }

    #[test]
    fn dispatch_completes_only_todays_active_rides() {
        let (mut ledger, mut fleet) = setup();
        let a = ledger
            .create(&mut fleet, request("A", "Manila", "Makati", VehicleClass::Sedan))
            .unwrap();
        let b = ledger
            .create(&mut fleet, request("B", "Manila", "Makati", VehicleClass::Suv))
            .unwrap();
        let mut tomorrow = request("C", "Manila", "Makati", VehicleClass::Van);
        tomorrow.date = RideDate::new(17, 10, 2026);
        let c = ledger.create(&mut fleet, tomorrow).unwrap();
        ledger.confirm(&a.ride_id).unwrap();
        ledger.cancel(&mut fleet, &b.ride_id).unwrap();

        let summary = ledger.dispatch_due(&mut fleet, TODAY);
        assert_eq!(summary.completed, vec![a.ride_id.clone()]);
        assert!(summary.failed.is_empty());
        assert_eq!(ledger.get(&b.ride_id).unwrap().status, RideStatus::Cancelled);
        assert_eq!(ledger.get(&c.ride_id).unwrap().status, RideStatus::Pending);
        assert_occupancy(&ledger, &fleet);
    }

    #[test]
    fn dispatch_skips_a_failing_ride_and_finishes_the_rest() {
        let fares = FareSchedule::with_only(&[(VehicleClass::Sedan, 40.0, 15.0)]);
        let mut ledger = RideLedger::new(geo(), Arc::new(fares));
        let mut fleet = FleetRegistry::with_drivers(vec![
            DriverRegistration::new(1, "Sergio Dela Cruz", "09409798726", VehicleClass::Sedan),
            DriverRegistration::new(3, "Jerome Gonzales", "09403210927", VehicleClass::Sedan),
            DriverRegistration::new(7, "Arnold Aguilar", "09483490869", VehicleClass::Bus),
        ])
        .unwrap();

        let a = ledger
            .create(&mut fleet, request("A", "Manila", "Makati", VehicleClass::Sedan))
            .unwrap();
        let b = ledger
            .create(&mut fleet, request("B", "Manila", "Makati", VehicleClass::Bus))
            .unwrap();
        let c = ledger
            .create(&mut fleet, request("C", "Manila", "Quezon City", VehicleClass::Sedan))
            .unwrap();

        let summary = ledger.dispatch_due(&mut fleet, TODAY);
        assert_eq!(summary.completed, vec![a.ride_id.clone(), c.ride_id.clone()]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].ride_id, b.ride_id);
        assert!(summary.failed[0].reason.contains("Bus"));

        assert_eq!(ledger.get(&c.ride_id).unwrap().status, RideStatus::Completed);
        let stuck = ledger.get(&b.ride_id).unwrap();
        assert_eq!(stuck.status, RideStatus::Pending);
        assert_eq!(stuck.assigned_driver_id, Some(7));
        assert!(fleet.driver(3).unwrap().available);
        assert_occupancy(&ledger, &fleet);
    }
}
