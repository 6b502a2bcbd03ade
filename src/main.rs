use std::process::ExitCode;

use galaxy_ride::{
    RideError, RideResult,
    session::{SessionPlan, run_session},
    state::{AppConfig, AppState},
};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> RideResult<()> {
    let plan_path = std::env::args()
        .nth(1)
        .ok_or_else(|| RideError::configuration_error("usage: galaxy-ride <session.json>"))?;

    let config = AppConfig::from_env()?;
    let mut state = AppState::new(config)?;
    let plan = SessionPlan::from_file(&plan_path)?;

    let report = run_session(&mut state, plan)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
