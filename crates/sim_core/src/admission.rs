use rand::Rng;

use crate::select::pick_weighted;
use crate::{OrderId, OrderState, SimConfig, SimState, StationId, StationState};

/// Roll for one arrival this tick. On success a new `Idle` order with a
/// freshly walked route is appended to the active set.
///
/// Draw order per admitted order: arrival roll, route walk, priority.
pub(crate) fn admit_order(
    state: &mut SimState,
    config: &SimConfig,
    rng: &mut impl Rng,
) -> Option<OrderId> {
    if !rng.gen_bool(config.arrival_probability) {
        return None;
    }

    let station_plan = plan_route(&state.stations, config.terminal_station(), rng);
    let priority = rng.gen_range(1..config.priority_levels);
    let planned_ticks: u64 = station_plan
        .iter()
        .filter_map(|id| state.station(*id))
        .map(|station| station.baseline_ticks)
        .sum();
    let time_to_deadline = i64::try_from(planned_ticks).unwrap_or(i64::MAX);

    let id = OrderId(state.counters.next_order_id);
    state.counters.next_order_id += 1;

    tracing::debug!(
        tick = state.meta.tick,
        order = %id,
        priority,
        stops = station_plan.len(),
        "order admitted"
    );
    state.orders.push(OrderState::new(
        id,
        priority,
        state.meta.tick,
        station_plan,
        time_to_deadline,
    ));
    Some(id)
}

/// Random walk over the transition rows, starting at station 0 and ending on
/// (and including) `terminal`. Revisits stay in the plan as separate slots.
pub fn plan_route(
    stations: &[StationState],
    terminal: StationId,
    rng: &mut impl Rng,
) -> Vec<StationId> {
    let mut current = StationId(0);
    let mut plan = vec![current];
    while current != terminal {
        let Some(next) = stations
            .get(current.index())
            .and_then(|station| pick_weighted(&station.transitions, rng))
        else {
            break;
        };
        current = StationId(next);
        plan.push(current);
    }
    plan
}
