use rand::Rng;
use serde::Serialize;

use crate::admission::admit_order;
use crate::dispatch::dispatch;
use crate::invariants::check_invariants;
use crate::metrics::{compute_snapshot, TickSnapshot};
use crate::validate::validate_config;
use crate::wear::run_maintenance;
use crate::work::advance_orders;
use crate::{
    ConfigError, Counters, InvariantViolation, MetaState, OrderId, ResourceId, ResourceState,
    SimConfig, SimError, SimState, StationId, StationState,
};

/// What happened during one tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub admitted: Option<OrderId>,
    /// Orders completed this tick, ascending by id.
    pub completed: Vec<OrderId>,
    pub maintenance: bool,
    pub snapshot: TickSnapshot,
}

/// Validate `config` and build the state for tick 0: every station and
/// resource free, stations at full performance, no orders.
pub fn build_initial_state(config: &SimConfig, seed: u64) -> Result<SimState, ConfigError> {
    validate_config(config)?;
    let stations = config
        .stations
        .iter()
        .enumerate()
        .map(|(idx, def)| StationState {
            id: StationId(idx),
            transitions: def.transitions.clone(),
            baseline_ticks: def.baseline_ticks,
            performance: 1.0,
            available: true,
        })
        .collect();
    let resources = config
        .resources
        .iter()
        .enumerate()
        .map(|(idx, def)| ResourceState {
            id: ResourceId(idx),
            productivity: def.productivity,
            available: true,
        })
        .collect();
    Ok(SimState {
        meta: MetaState { tick: 0, seed },
        stations,
        resources,
        orders: Vec::new(),
        completed: Vec::new(),
        counters: Counters { next_order_id: 1 },
    })
}

/// Advance the simulation by one tick.
///
/// Order of operations:
/// 1. Admit at most one new order.
/// 2. Give free resources to orders waiting at a station.
/// 3. Give free stations (and, if possible, resources) to idle orders.
/// 4. Advance every order: waiting counters, service time, wear, releases.
/// 5. Reset station performance if this is a maintenance tick.
/// 6. Snapshot occupancy and verify state consistency.
/// 7. Increment tick counter.
///
/// An `Err` means the state is corrupt and the run must stop.
pub fn tick(
    state: &mut SimState,
    config: &SimConfig,
    rng: &mut impl Rng,
) -> Result<TickReport, InvariantViolation> {
    let admitted = admit_order(state, config, rng);
    dispatch(state, config, rng);
    let completed = advance_orders(state, config, rng);
    let maintenance = run_maintenance(state, config);

    let snapshot = compute_snapshot(state);
    check_invariants(state)?;
    tracing::trace!(
        tick = snapshot.tick,
        active = snapshot.active_orders,
        stations_available = snapshot.stations_available,
        resources_available = snapshot.resources_available,
        "tick complete"
    );

    let report = TickReport {
        tick: state.meta.tick,
        admitted,
        completed,
        maintenance,
        snapshot,
    };
    state.meta.tick += 1;
    Ok(report)
}

pub fn is_finished(state: &SimState, config: &SimConfig) -> bool {
    state.meta.tick >= config.horizon_ticks
}

/// Tick until the horizon, handing each report to `on_tick`. Orders still
/// in flight at the horizon are left active.
pub fn run_to_horizon(
    state: &mut SimState,
    config: &SimConfig,
    rng: &mut impl Rng,
    mut on_tick: impl FnMut(&SimState, &TickReport),
) -> Result<(), InvariantViolation> {
    while !is_finished(state, config) {
        let report = tick(state, config, rng)?;
        on_tick(state, &report);
    }
    Ok(())
}

/// Build and run a whole simulation, returning the final state.
pub fn simulate(
    config: &SimConfig,
    seed: u64,
    rng: &mut impl Rng,
) -> Result<SimState, SimError> {
    let mut state = build_initial_state(config, seed)?;
    run_to_horizon(&mut state, config, rng, |_, _| {})?;
    Ok(state)
}
