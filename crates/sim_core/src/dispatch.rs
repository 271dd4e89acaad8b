//! Two-phase matching of orders to stations and resources.
//!
//! Candidate sets are collected once at the start of dispatch and drained as
//! matches happen, so nothing is assigned twice within a tick. Entities
//! released later in the same tick become candidates on the next one.

use std::collections::BTreeSet;

use rand::Rng;

use crate::select::take_uniform;
use crate::{
    DispatchPolicy, OrderState, OrderStatus, ResourceId, SimConfig, SimState, StationId,
};

/// Free stations and resources not yet matched this tick.
#[derive(Debug, Clone, Default)]
pub(crate) struct Candidates {
    stations: BTreeSet<StationId>,
    resources: Vec<ResourceId>,
}

impl Candidates {
    pub(crate) fn collect(state: &SimState) -> Self {
        Self {
            stations: state
                .stations
                .iter()
                .filter(|station| station.available)
                .map(|station| station.id)
                .collect(),
            resources: state
                .resources
                .iter()
                .filter(|resource| resource.available)
                .map(|resource| resource.id)
                .collect(),
        }
    }

    fn take_station(&mut self, id: StationId) -> bool {
        self.stations.remove(&id)
    }

    fn take_resource(&mut self, rng: &mut impl Rng) -> Option<ResourceId> {
        take_uniform(&mut self.resources, rng)
    }
}

/// Sort key for contending orders; lower is served first.
pub fn dispatch_key(order: &OrderState, policy: DispatchPolicy) -> (i64, u32) {
    match policy {
        DispatchPolicy::DeadlineThenPriority => (order.time_to_deadline, order.priority),
        DispatchPolicy::PriorityOnly => (0, order.priority),
    }
}

pub(crate) fn dispatch(state: &mut SimState, config: &SimConfig, rng: &mut impl Rng) {
    let mut candidates = Candidates::collect(state);
    continue_waiting_orders(state, config.dispatch_policy, &mut candidates, rng);
    assign_idle_orders(state, config.dispatch_policy, &mut candidates, rng);
}

/// Indices into `state.orders` with `status`, in dispatch order.
///
/// `state.orders` is kept ascending by id and the sort is stable, so equal
/// keys fall back to creation order.
fn queue(state: &SimState, status: OrderStatus, policy: DispatchPolicy) -> Vec<usize> {
    let mut indices: Vec<usize> = state
        .orders
        .iter()
        .enumerate()
        .filter(|(_, order)| order.status == status)
        .map(|(idx, _)| idx)
        .collect();
    indices.sort_by_key(|&idx| dispatch_key(&state.orders[idx], policy));
    indices
}

/// Phase A: orders already holding a station get a resource if one is free.
fn continue_waiting_orders(
    state: &mut SimState,
    policy: DispatchPolicy,
    candidates: &mut Candidates,
    rng: &mut impl Rng,
) {
    for idx in queue(state, OrderStatus::WaitingAtStation, policy) {
        let Some(resource) = candidates.take_resource(rng) else {
            break;
        };
        occupy_resource(state, idx, resource);
    }
}

/// Phase B: idle orders claim their next planned station, then try for a
/// resource straight away.
fn assign_idle_orders(
    state: &mut SimState,
    policy: DispatchPolicy,
    candidates: &mut Candidates,
    rng: &mut impl Rng,
) {
    for idx in queue(state, OrderStatus::Idle, policy) {
        let Some(station) = state.orders[idx].next_planned_station() else {
            continue;
        };
        if !candidates.take_station(station) {
            continue;
        }
        state.stations[station.index()].available = false;
        state.orders[idx].enter_station(station);
        tracing::debug!(
            tick = state.meta.tick,
            order = %state.orders[idx].id,
            %station,
            "station assigned"
        );

        if let Some(resource) = candidates.take_resource(rng) {
            occupy_resource(state, idx, resource);
        }
    }
}

fn occupy_resource(state: &mut SimState, idx: usize, resource: ResourceId) {
    state.resources[resource.index()].available = false;
    let order = &mut state.orders[idx];
    order.assign_resource(resource);
    tracing::debug!(
        tick = state.meta.tick,
        order = %order.id,
        %resource,
        "resource assigned"
    );
}
