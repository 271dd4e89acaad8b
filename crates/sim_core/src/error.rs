use thiserror::Error;

use crate::{OrderId, ResourceId, StationId};

/// Rejected configuration. Raised before the first tick; the run must not start.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("station count must be at least 1")]
    NoStations,

    #[error("horizon must be at least 1 tick")]
    ZeroHorizon,

    #[error("priority level count must be at least 2, got {0}")]
    TooFewPriorityLevels(u32),

    #[error("maintenance interval must be at least 1 tick")]
    ZeroMaintenanceInterval,

    #[error("arrival probability must be within [0, 1], got {0}")]
    ArrivalProbabilityOutOfRange(f64),

    #[error("max degradation per tick must be finite and non-negative, got {0}")]
    InvalidDegradation(f64),

    #[error("duration noise sigma must be finite and non-negative, got {0}")]
    InvalidNoiseSigma(f64),

    #[error("{station} baseline duration must be positive")]
    NonPositiveBaseline { station: StationId },

    #[error("{resource} productivity must be finite and positive, got {productivity}")]
    NonPositiveProductivity {
        resource: ResourceId,
        productivity: f64,
    },

    #[error("{station} transition row has {actual} entries, expected {expected}")]
    TransitionRowLength {
        station: StationId,
        expected: usize,
        actual: usize,
    },

    #[error("{station} transition weight {weight} for {target} is negative or not finite")]
    InvalidTransitionWeight {
        station: StationId,
        target: StationId,
        weight: f64,
    },

    #[error("{station} transition row sums to {sum}, expected 1")]
    TransitionRowSum { station: StationId, sum: f64 },

    #[error("terminal {terminal} is unreachable from {station}; routes would never end")]
    TerminalUnreachable {
        station: StationId,
        terminal: StationId,
    },
}

/// Corrupted simulation state. Fatal: later ticks would compound the inconsistency.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("{order} is at {station}, which is not the current slot of its plan")]
    StationNotInPlan { order: OrderId, station: StationId },

    #[error("{station} is unavailable but no order occupies it")]
    OrphanedStation { station: StationId },

    #[error("{station} availability disagrees with its {occupants} occupant(s)")]
    StationOccupancy { station: StationId, occupants: usize },

    #[error("{resource} is unavailable but no order occupies it")]
    OrphanedResource { resource: ResourceId },

    #[error("{resource} availability disagrees with its {occupants} occupant(s)")]
    ResourceOccupancy {
        resource: ResourceId,
        occupants: usize,
    },

    #[error("{order} log lengths are inconsistent: {detail}")]
    LogLength { order: OrderId, detail: String },

    #[error("{order} status {status} does not match its current assignment")]
    StatusMismatch { order: OrderId, status: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}
