//! Scripted replays of backend sessions against headless collaborators.

mod scenario;

pub use scenario::{EvictionOutcome, Lookup, ReplayReport, Scenario, Step, StepError, run_scenario};
