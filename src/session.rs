// src/session.rs
//! Non-interactive replay of a booking session: the same sequence of
//! operations the menu would issue, read from a JSON plan.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    errors::{RideError, RideResult},
    models::{
        driver::Driver,
        ride::{Ride, RideDate, RideEdit, RideRequest},
    },
    services::{
        fare_schedule::CURRENCY,
        fleet_registry::FleetOperations,
        geo_index::GeoIndex,
        ride_grouper::{BatchKey, BatchSignature, RideGrouper},
        ride_ledger::DispatchFailure,
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SessionPlan {
    /// Dispatch date; defaults to the current UTC date.
    #[serde(default)]
    pub today: Option<RideDate>,
    pub steps: Vec<SessionStep>,
}

/// One operator action. Rides are targeted with a search query (ride id or
/// passenger name) and the action applies to every match.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionStep {
    Book {
        passengers: Vec<RideRequest>,
        #[serde(default = "proceed")]
        confirm: bool,
    },
    Confirm {
        target: String,
    },
    Edit {
        target: String,
        edit: RideEdit,
    },
    Cancel {
        target: String,
    },
    Delete {
        target: String,
    },
}

fn proceed() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    pub ride_id: Option<String>,
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub key: BatchKey,
    pub ride_ids: Vec<String>,
    pub passengers: u32,
    pub driver: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub today: RideDate,
    pub outcomes: Vec<StepOutcome>,
    pub batches: Vec<BatchSummary>,
    pub duplicate_batches: usize,
    pub dispatched: Vec<String>,
    pub dispatch_failures: Vec<DispatchFailure>,
    pub rides: Vec<Ride>,
    pub available_drivers: Vec<Driver>,
}

impl SessionPlan {
    pub fn from_file(path: impl AsRef<Path>) -> RideResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

// Failed lookups list the known names that contain what was typed.
fn describe(geo: &GeoIndex, err: &RideError) -> String {
    match err {
        RideError::LocationNotFound { name, .. } => {
            let suggestions = geo.suggestions(name);
            if suggestions.is_empty() {
                err.to_string()
            } else {
                format!("{} (did you mean: {})", err, suggestions.join(", "))
            }
        }
        _ => err.to_string(),
    }
}

impl StepOutcome {
    fn record(
        geo: &GeoIndex,
        step: usize,
        ride_id: Option<&str>,
        result: RideResult<String>,
    ) -> Self {
        let ride_id = ride_id.map(str::to_string);
        match result {
            Ok(message) => Self { step, ride_id, ok: true, message },
            Err(err) => {
                tracing::warn!("Step {} failed: {}", step, err);
                Self {
                    step,
                    ride_id,
                    ok: false,
                    message: describe(geo, &err),
                }
            }
        }
    }
}

fn matching_ids(state: &AppState, target: &str) -> Vec<String> {
    state
        .ledger
        .find(target)
        .into_iter()
        .map(|r| r.ride_id.clone())
        .collect()
}

fn run_step(
    state: &mut AppState,
    step: usize,
    action: SessionStep,
    signatures: &mut Vec<BatchSignature>,
    outcomes: &mut Vec<StepOutcome>,
) {
    let target = match &action {
        SessionStep::Book { .. } => None,
        SessionStep::Confirm { target }
        | SessionStep::Edit { target, .. }
        | SessionStep::Cancel { target }
        | SessionStep::Delete { target } => Some(target.clone()),
    };
    let ids = match &target {
        Some(target) => matching_ids(state, target),
        None => Vec::new(),
    };
    if let Some(target) = &target {
        if ids.is_empty() {
            outcomes.push(StepOutcome {
                step,
                ride_id: None,
                ok: false,
                message: format!("No rides match '{}'", target),
            });
            return;
        }
    }

    let AppState { geo, ledger, fleet, .. } = state;
    match action {
        SessionStep::Book { passengers, confirm } => {
            let batch = match ledger.create_batch(fleet, passengers) {
                Ok(batch) => batch,
                Err(err) => {
                    outcomes.push(StepOutcome::record(geo, step, None, Err(err)));
                    return;
                }
            };
            signatures.push(batch.signature);

            for ride in batch.rides {
                let result = if confirm {
                    ledger.confirm(&ride.ride_id).map(|r| {
                        format!("confirmed, fare {} {:.2}", CURRENCY, r.fare.unwrap_or_default())
                    })
                } else {
                    ledger.cancel(fleet, &ride.ride_id).map(|_| "booking declined".to_string())
                };
                outcomes.push(StepOutcome::record(geo, step, Some(&ride.ride_id), result));
            }
        }
        SessionStep::Confirm { .. } => {
            for id in &ids {
                let result = ledger.confirm(id).map(|_| "confirmed".to_string());
                outcomes.push(StepOutcome::record(geo, step, Some(id), result));
            }
        }
        SessionStep::Edit { edit, .. } => {
            for id in &ids {
                let result = ledger.edit(fleet, id, edit.clone()).map(|_| "edited".to_string());
                outcomes.push(StepOutcome::record(geo, step, Some(id), result));
            }
        }
        SessionStep::Cancel { .. } => {
            for id in &ids {
                let result = ledger.cancel(fleet, id).map(|_| "cancelled".to_string());
                outcomes.push(StepOutcome::record(geo, step, Some(id), result));
            }
        }
        SessionStep::Delete { .. } => {
            for id in &ids {
                let result = ledger.delete(fleet, id).map(|_| "deleted".to_string());
                outcomes.push(StepOutcome::record(geo, step, Some(id), result));
            }
        }
    }
}

fn summarize_batches(state: &AppState) -> Vec<BatchSummary> {
    RideGrouper::group_active(state.ledger.rides())
        .into_iter()
        .map(|batch| {
            let driver = batch
                .rides
                .iter()
                .find_map(|r| r.assigned_driver_id)
                .and_then(|id| state.fleet.driver(id))
                .map(|d| format!("{} (Contact: {})", d.name, d.phone));
            BatchSummary {
                passengers: batch.passenger_total(),
                ride_ids: batch.rides.iter().map(|r| r.ride_id.clone()).collect(),
                key: batch.key,
                driver,
            }
        })
        .collect()
}

/// Replay `plan` against the engine, then batch the confirmed rides and
/// dispatch everything due today. Step and dispatch failures are recorded in
/// the report rather than ending the run.
pub fn run_session(state: &mut AppState, plan: SessionPlan) -> RideResult<SessionReport> {
    let today = plan.today.unwrap_or_else(RideDate::today);
    tracing::info!("Replaying {} steps for {}", plan.steps.len(), today);

    let mut signatures = Vec::new();
    let mut outcomes = Vec::new();
    for (step, action) in plan.steps.into_iter().enumerate() {
        run_step(state, step + 1, action, &mut signatures, &mut outcomes);
    }

    let batches = summarize_batches(state);
    let duplicate_batches = RideGrouper::count_duplicate_batches(&signatures);
    let dispatch = state.ledger.dispatch_due(&mut state.fleet, today);
    tracing::info!(
        "Dispatched {} rides in {} batches ({} duplicate bookings, {} failed)",
        dispatch.completed.len(),
        batches.len(),
        duplicate_batches,
        dispatch.failed.len()
    );

    Ok(SessionReport {
        today,
        outcomes,
        batches,
        duplicate_batches,
        dispatched: dispatch.completed,
        dispatch_failures: dispatch.failed,
        rides: state.ledger.rides().to_vec(),
        available_drivers: state.fleet.list_available().into_iter().cloned().collect(),
    })
}
