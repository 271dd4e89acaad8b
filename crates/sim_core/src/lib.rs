//! `sim_core`: deterministic production-flow simulation tick.
//!
//! No IO, no network. All randomness via the passed-in Rng.

mod admission;
mod dispatch;
mod engine;
mod error;
mod graph;
mod invariants;
pub mod metrics;
mod order;
mod select;
mod types;
mod validate;
mod wear;
mod work;

pub use admission::plan_route;
pub use dispatch::dispatch_key;
pub use engine::{build_initial_state, is_finished, run_to_horizon, simulate, tick, TickReport};
pub use error::{ConfigError, InvariantViolation, SimError};
pub use graph::{reachable_stations, stations_reaching};
pub use invariants::check_invariants;
pub use metrics::{compute_snapshot, TickSnapshot};
pub use select::{pick_weighted, take_uniform};
pub use types::*;
pub use validate::{validate_config, TRANSITION_SUM_TOLERANCE};
pub use wear::degrade;
pub use work::{sample_target_duration, MIN_PERFORMANCE};

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

#[cfg(test)]
mod tests;
