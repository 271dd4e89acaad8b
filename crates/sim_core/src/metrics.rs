//! Per-tick snapshot of occupancy, handed to whatever exports the run.
//!
//! `compute_snapshot(&SimState) -> TickSnapshot` only reads state. No IO.

use serde::Serialize;

use crate::SimState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickSnapshot {
    pub tick: u64,
    pub stations_available: usize,
    pub resources_available: usize,
    /// Orders admitted and not yet complete.
    pub active_orders: usize,
    pub completed_orders: usize,
    /// Indexed by `StationId`.
    pub station_available: Vec<bool>,
    /// Indexed by `StationId`, sampled after maintenance.
    pub station_performance: Vec<f64>,
    /// Indexed by `ResourceId`.
    pub resource_available: Vec<bool>,
}

impl TickSnapshot {
    pub fn stations_busy(&self) -> usize {
        self.station_available.len() - self.stations_available
    }

    pub fn resources_busy(&self) -> usize {
        self.resource_available.len() - self.resources_available
    }
}

pub fn compute_snapshot(state: &SimState) -> TickSnapshot {
    let station_available: Vec<bool> = state.stations.iter().map(|s| s.available).collect();
    let resource_available: Vec<bool> = state.resources.iter().map(|r| r.available).collect();
    TickSnapshot {
        tick: state.meta.tick,
        stations_available: station_available.iter().filter(|a| **a).count(),
        resources_available: resource_available.iter().filter(|a| **a).count(),
        active_orders: state.orders.len(),
        completed_orders: state.completed.len(),
        station_available,
        station_performance: state.stations.iter().map(|s| s.performance).collect(),
        resource_available,
    }
}
