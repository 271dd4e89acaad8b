//! Shared test fixtures for sim_core and downstream crates.
//!
//! Fixture configs use zero duration noise so service times equal their
//! baselines exactly; tests that need the noise set it back explicitly.

use crate::{DispatchPolicy, ResourceDef, SimConfig, StationDef};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// One station, one resource, an order every tick, one-tick service, no wear.
pub fn single_station_config() -> SimConfig {
    SimConfig {
        stations: vec![StationDef {
            transitions: vec![1.0],
            baseline_ticks: 1,
        }],
        resources: vec![ResourceDef { productivity: 1.0 }],
        maintenance_interval_ticks: 100,
        max_degradation_per_tick: 0.0,
        horizon_ticks: 10,
        arrival_probability: 1.0,
        priority_levels: 5,
        dispatch_policy: DispatchPolicy::DeadlineThenPriority,
        duration_noise_sigma: 0.0,
    }
}

/// `n` stations visited strictly in order (0, 1, ..., n-1), two-tick
/// baselines, one resource per station, no arrivals.
pub fn chain_config(n: usize) -> SimConfig {
    let stations = (0..n)
        .map(|idx| {
            let mut transitions = vec![0.0; n];
            transitions[(idx + 1).min(n - 1)] = 1.0;
            StationDef {
                transitions,
                baseline_ticks: 2,
            }
        })
        .collect();
    SimConfig {
        stations,
        resources: vec![ResourceDef { productivity: 1.0 }; n],
        maintenance_interval_ticks: 1000,
        max_degradation_per_tick: 0.0,
        horizon_ticks: 100,
        arrival_probability: 0.0,
        priority_levels: 5,
        dispatch_policy: DispatchPolicy::DeadlineThenPriority,
        duration_noise_sigma: 0.0,
    }
}

/// A branching five-station routing matrix with a revisit loop on station 2,
/// three resources of mixed productivity and real wear.
pub fn branching_config() -> SimConfig {
    let rows = [
        [0.0, 0.6, 0.4, 0.0, 0.0],
        [0.0, 0.0, 0.7, 0.3, 0.0],
        [0.0, 0.0, 0.2, 0.5, 0.3],
        [0.0, 0.0, 0.0, 0.0, 1.0],
        [0.0, 0.0, 0.0, 0.0, 1.0],
    ];
    let baselines = [3, 5, 2, 4, 1];
    SimConfig {
        stations: rows
            .iter()
            .zip(baselines)
            .map(|(row, baseline_ticks)| StationDef {
                transitions: row.to_vec(),
                baseline_ticks,
            })
            .collect(),
        resources: vec![
            ResourceDef { productivity: 0.8 },
            ResourceDef { productivity: 1.0 },
            ResourceDef { productivity: 1.5 },
        ],
        maintenance_interval_ticks: 20,
        max_degradation_per_tick: 0.05,
        horizon_ticks: 300,
        arrival_probability: 0.3,
        priority_levels: 5,
        dispatch_policy: DispatchPolicy::DeadlineThenPriority,
        duration_noise_sigma: 0.05,
    }
}

/// Deterministic RNG seeded with 42.
pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
