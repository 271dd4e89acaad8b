//! Type definitions for `sim_core`.
//!
//! All public types, structs, enums, and ID newtypes used by the simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! index_id {
    ($name:ident, $inner:ty, $prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub $inner);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "_{:04}"), self.0)
            }
        }
    };
}

index_id!(StationId, usize, "station");
index_id!(ResourceId, usize, "resource");
index_id!(OrderId, u64, "order");

impl StationId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl ResourceId {
    pub fn index(self) -> usize {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Waiting for the next planned station to become free.
    Idle,
    /// Holds a station, waiting for a resource.
    WaitingAtStation,
    /// Holds a station and a resource; service time is accruing.
    Working,
    Complete,
}

/// Sort key used to order contending orders in both dispatch phases.
///
/// Ties on the key are always broken by order id (creation order).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// `(time_to_deadline, priority)`, both ascending.
    #[default]
    DeadlineThenPriority,
    /// `priority` ascending only.
    PriorityOnly,
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimState {
    pub meta: MetaState,
    /// Indexed by `StationId`.
    pub stations: Vec<StationState>,
    /// Indexed by `ResourceId`.
    pub resources: Vec<ResourceState>,
    /// Orders not yet complete, ascending by id.
    pub orders: Vec<OrderState>,
    /// Completed orders in completion order.
    pub completed: Vec<OrderState>,
    pub counters: Counters,
}

impl SimState {
    pub fn station(&self, id: StationId) -> Option<&StationState> {
        self.stations.get(id.index())
    }

    pub fn resource(&self, id: ResourceId) -> Option<&ResourceState> {
        self.resources.get(id.index())
    }

    pub fn order(&self, id: OrderId) -> Option<&OrderState> {
        self.orders
            .iter()
            .chain(self.completed.iter())
            .find(|order| order.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaState {
    /// The tick that the next call to `tick` will process.
    pub tick: u64,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counters {
    pub next_order_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationState {
    pub id: StationId,
    /// Probability of moving to each station next. Sums to 1.
    pub transitions: Vec<f64>,
    pub baseline_ticks: u64,
    /// Speed multiplier in `[0, 1]`. Degrades with use, reset by maintenance.
    pub performance: f64,
    /// False exactly while one order occupies the station.
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    pub id: ResourceId,
    pub productivity: f64,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderState {
    pub id: OrderId,
    /// In `1..priority_levels`; lower values are dispatched first.
    pub priority: u32,
    pub created_tick: u64,
    /// Planned visits. A station may appear more than once.
    pub station_plan: Vec<StationId>,
    pub status: OrderStatus,
    pub current_station: Option<StationId>,
    pub current_resource: Option<ResourceId>,
    /// Service ticks required for the current visit, sampled on its first working tick.
    pub target_duration: Option<u64>,
    /// Sum of planned baselines at creation, decremented every tick. May go negative.
    pub time_to_deadline: i64,

    pub station_log: Vec<StationId>,
    pub resource_log: Vec<ResourceId>,
    /// Working ticks per visited slot.
    pub duration_log: Vec<u64>,
    /// Ticks waited for the station of each planned slot.
    pub waiting_time_log: Vec<u64>,
    /// Ticks waited for a resource while holding the station, per visited slot.
    pub waiting_at_station_log: Vec<u64>,
    /// First working tick of each visit that has started work.
    pub work_start_log: Vec<u64>,
    /// Release tick of each finished visit.
    pub work_end_log: Vec<u64>,
    /// Mean station performance over the working ticks of each finished visit.
    pub mean_performance_log: Vec<f64>,
    /// Running sum of performance samples for the current visit.
    #[serde(default)]
    pub performance_sum: f64,
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub stations: Vec<StationDef>,
    pub resources: Vec<ResourceDef>,
    pub maintenance_interval_ticks: u64,
    /// Upper bound of the uniform performance loss per working tick.
    pub max_degradation_per_tick: f64,
    pub horizon_ticks: u64,
    /// Probability that one order is admitted on a given tick.
    pub arrival_probability: f64,
    /// Priorities are drawn from `1..priority_levels`.
    pub priority_levels: u32,
    #[serde(default)]
    pub dispatch_policy: DispatchPolicy,
    /// Standard deviation of the `N(1, sigma)` service-time noise.
    #[serde(default = "default_duration_noise_sigma")]
    pub duration_noise_sigma: f64,
}

pub const DEFAULT_DURATION_NOISE_SIGMA: f64 = 0.05;

fn default_duration_noise_sigma() -> f64 {
    DEFAULT_DURATION_NOISE_SIGMA
}

impl SimConfig {
    /// The absorbing station that ends every route: the last one.
    pub fn terminal_station(&self) -> StationId {
        StationId(self.stations.len().saturating_sub(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationDef {
    pub transitions: Vec<f64>,
    pub baseline_ticks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDef {
    pub productivity: f64,
}
