//! Work phase: advance every active order by one tick.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::wear::degrade;
use crate::{
    OrderId, OrderState, OrderStatus, ResourceState, SimConfig, SimState, StationState,
};

/// Lowest performance used when sizing a visit. A worn-out station is slow,
/// not stopped: the target stays finite and the visit ends.
pub const MIN_PERFORMANCE: f64 = 0.01;

/// Service ticks for one visit:
/// `round(baseline / productivity / performance * N(1, sigma))`, at least 1.
///
/// `performance` is floored at [`MIN_PERFORMANCE`].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sample_target_duration(
    baseline_ticks: u64,
    productivity: f64,
    performance: f64,
    noise_sigma: f64,
    rng: &mut impl Rng,
) -> u64 {
    let noise = if noise_sigma > 0.0 {
        Normal::new(1.0, noise_sigma).map_or(1.0, |normal| normal.sample(rng))
    } else {
        1.0
    };
    let performance = performance.max(MIN_PERFORMANCE);
    let raw = (baseline_ticks as f64 / productivity / performance * noise).round();
    if raw.is_nan() {
        return 1;
    }
    (raw as u64).max(1)
}

/// Applies one tick to every active order and moves finished orders to the
/// completed set. Returns the ids completed this tick.
pub(crate) fn advance_orders(
    state: &mut SimState,
    config: &SimConfig,
    rng: &mut impl Rng,
) -> Vec<OrderId> {
    let tick = state.meta.tick;
    let SimState {
        orders,
        stations,
        resources,
        completed,
        ..
    } = state;

    for order in orders.iter_mut() {
        order.time_to_deadline -= 1;
        match order.status {
            OrderStatus::Idle | OrderStatus::WaitingAtStation => order.record_wait(),
            OrderStatus::Working => work_one_tick(order, stations, resources, config, tick, rng),
            OrderStatus::Complete => {}
        }
    }

    let (done, active): (Vec<OrderState>, Vec<OrderState>) =
        std::mem::take(orders).into_iter().partition(OrderState::is_complete);
    *orders = active;

    let ids: Vec<OrderId> = done.iter().map(|order| order.id).collect();
    for order in &done {
        tracing::debug!(
            tick,
            order = %order.id,
            stops = order.station_log.len(),
            age = tick - order.created_tick,
            "order completed"
        );
    }
    completed.extend(done);
    ids
}

fn work_one_tick(
    order: &mut OrderState,
    stations: &mut [StationState],
    resources: &mut [ResourceState],
    config: &SimConfig,
    tick: u64,
    rng: &mut impl Rng,
) {
    let (Some(station_id), Some(resource_id)) = (order.current_station, order.current_resource)
    else {
        return;
    };
    let Some(station) = stations.get_mut(station_id.index()) else {
        return;
    };
    let productivity = resources
        .get(resource_id.index())
        .map_or(1.0, |resource| resource.productivity);

    let target = match order.target_duration {
        Some(target) => target,
        None => {
            let target = sample_target_duration(
                station.baseline_ticks,
                productivity,
                station.performance,
                config.duration_noise_sigma,
                rng,
            );
            order.target_duration = Some(target);
            target
        }
    };

    let worked = order.record_work(tick, station.performance);
    station.performance = degrade(station.performance, config.max_degradation_per_tick, rng);

    if worked < target {
        return;
    }

    let (released_station, released_resource) = order.finish_visit(tick);
    if let Some(station) = released_station.and_then(|id| stations.get_mut(id.index())) {
        station.available = true;
    }
    if let Some(resource) = released_resource.and_then(|id| resources.get_mut(id.index())) {
        resource.available = true;
    }
}
