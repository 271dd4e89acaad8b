//! Station wear and maintenance.

use rand::Rng;

use crate::{SimConfig, SimState};

/// Performance after one working tick: a uniform loss in `[0, max_degradation)`,
/// floored at zero.
pub fn degrade(performance: f64, max_degradation: f64, rng: &mut impl Rng) -> f64 {
    let loss = rng.gen::<f64>() * max_degradation;
    (performance - loss).max(0.0)
}

/// Fleet-wide reset: on every tick that is a multiple of the maintenance
/// interval (tick 0 included) all stations return to full performance.
pub(crate) fn run_maintenance(state: &mut SimState, config: &SimConfig) -> bool {
    if !state
        .meta
        .tick
        .is_multiple_of(config.maintenance_interval_ticks)
    {
        return false;
    }
    for station in &mut state.stations {
        station.performance = 1.0;
    }
    tracing::trace!(tick = state.meta.tick, "maintenance reset all stations");
    true
}
