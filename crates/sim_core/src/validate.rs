//! Up-front configuration checks. A config that passes is safe to run for
//! any seed: every route terminates and every duration is well defined.

use crate::graph::{reachable_stations, stations_reaching};
use crate::{ConfigError, ResourceId, SimConfig, StationId};

/// Allowed deviation of a transition row sum from 1.
pub const TRANSITION_SUM_TOLERANCE: f64 = 1e-6;

pub fn validate_config(config: &SimConfig) -> Result<(), ConfigError> {
    if config.stations.is_empty() {
        return Err(ConfigError::NoStations);
    }
    if config.horizon_ticks == 0 {
        return Err(ConfigError::ZeroHorizon);
    }
    if config.priority_levels < 2 {
        return Err(ConfigError::TooFewPriorityLevels(config.priority_levels));
    }
    if config.maintenance_interval_ticks == 0 {
        return Err(ConfigError::ZeroMaintenanceInterval);
    }
    if !(0.0..=1.0).contains(&config.arrival_probability) {
        return Err(ConfigError::ArrivalProbabilityOutOfRange(
            config.arrival_probability,
        ));
    }
    if !config.max_degradation_per_tick.is_finite() || config.max_degradation_per_tick < 0.0 {
        return Err(ConfigError::InvalidDegradation(
            config.max_degradation_per_tick,
        ));
    }
    if !config.duration_noise_sigma.is_finite() || config.duration_noise_sigma < 0.0 {
        return Err(ConfigError::InvalidNoiseSigma(config.duration_noise_sigma));
    }

    validate_stations(config)?;

    for (idx, resource) in config.resources.iter().enumerate() {
        if !resource.productivity.is_finite() || resource.productivity <= 0.0 {
            return Err(ConfigError::NonPositiveProductivity {
                resource: ResourceId(idx),
                productivity: resource.productivity,
            });
        }
    }
    if config.resources.is_empty() {
        tracing::warn!("no resources configured; orders will never be worked");
    }

    validate_routes(config)
}

fn validate_stations(config: &SimConfig) -> Result<(), ConfigError> {
    let expected = config.stations.len();
    for (idx, def) in config.stations.iter().enumerate() {
        let station = StationId(idx);
        if def.baseline_ticks == 0 {
            return Err(ConfigError::NonPositiveBaseline { station });
        }
        if def.transitions.len() != expected {
            return Err(ConfigError::TransitionRowLength {
                station,
                expected,
                actual: def.transitions.len(),
            });
        }
        if let Some((target, weight)) = def
            .transitions
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(ConfigError::InvalidTransitionWeight {
                station,
                target: StationId(target),
                weight: *weight,
            });
        }
        let sum: f64 = def.transitions.iter().sum();
        if (sum - 1.0).abs() > TRANSITION_SUM_TOLERANCE {
            return Err(ConfigError::TransitionRowSum { station, sum });
        }
    }
    Ok(())
}

/// Every station a route can enter must still be able to reach the terminal.
fn validate_routes(config: &SimConfig) -> Result<(), ConfigError> {
    let terminal = config.terminal_station();
    let can_finish = stations_reaching(terminal, &config.stations);
    let visitable = reachable_stations(StationId(0), terminal, &config.stations);
    match visitable.iter().find(|station| !can_finish.contains(station)) {
        Some(&station) => Err(ConfigError::TerminalUnreachable { station, terminal }),
        None => Ok(()),
    }
}
