use super::*;
use crate::test_fixtures::{branching_config, chain_config, make_rng, single_station_config};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod integration;
mod lifecycle;

// --- Shared test helpers ------------------------------------------------

fn test_state(config: &SimConfig) -> SimState {
    build_initial_state(config, 42).unwrap()
}

/// Config with no arrivals, so tests control every order explicitly.
fn quiet(mut config: SimConfig) -> SimConfig {
    config.arrival_probability = 0.0;
    config
}

/// Insert an idle order with a hand-picked plan and deadline.
fn push_order(state: &mut SimState, priority: u32, time_to_deadline: i64, plan: &[usize]) -> OrderId {
    let id = OrderId(state.counters.next_order_id);
    state.counters.next_order_id += 1;
    let plan = plan.iter().copied().map(StationId).collect();
    state.orders.push(OrderState::new(
        id,
        priority,
        state.meta.tick,
        plan,
        time_to_deadline,
    ));
    id
}

fn run_ticks(
    state: &mut SimState,
    config: &SimConfig,
    rng: &mut impl rand::Rng,
    count: u64,
) -> Vec<TickReport> {
    (0..count)
        .map(|_| tick(state, config, rng).unwrap())
        .collect()
}

fn find_order(state: &SimState, id: OrderId) -> &OrderState {
    state.order(id).unwrap()
}
