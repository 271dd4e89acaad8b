//! Scenario loading and preset generation shared by the CLI and tests.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sim_core::{
    validate_config, DispatchPolicy, ResourceDef, SimConfig, StationDef,
    DEFAULT_DURATION_NOISE_SIGMA,
};
use std::path::Path;

pub mod presets;

pub use presets::{generate_transitions, TransitionPreset};

/// Scenario file as written by hand or by `generate-config`.
///
/// Only the transition matrix is required. Omitted fields fall back to a
/// day-scale default: ten days of one-second ticks, hourly maintenance and
/// one order every ten minutes on average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFile {
    /// One row per station; the last station is the terminal.
    pub transitions: Vec<Vec<f64>>,
    /// Per-station baselines. Overrides `default_duration_ticks` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_ticks: Option<Vec<u64>>,
    #[serde(default = "default_duration_ticks")]
    pub default_duration_ticks: u64,
    #[serde(default = "default_maintenance_interval")]
    pub maintenance_interval_ticks: u64,
    /// Defaults to `1 / maintenance_interval_ticks`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_degradation_per_tick: Option<f64>,
    /// Defaults to one resource of productivity 1.0 per station.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_productivities: Option<Vec<f64>>,
    #[serde(default = "default_horizon")]
    pub horizon_ticks: u64,
    #[serde(default = "default_arrival_probability")]
    pub arrival_probability: f64,
    #[serde(default = "default_priority_levels")]
    pub priority_levels: u32,
    #[serde(default)]
    pub dispatch_policy: DispatchPolicy,
    #[serde(default = "default_noise_sigma")]
    pub duration_noise_sigma: f64,
}

fn default_duration_ticks() -> u64 {
    150
}

fn default_maintenance_interval() -> u64 {
    3600
}

fn default_horizon() -> u64 {
    864_000
}

fn default_arrival_probability() -> f64 {
    1.0 / 600.0
}

fn default_priority_levels() -> u32 {
    5
}

fn default_noise_sigma() -> f64 {
    DEFAULT_DURATION_NOISE_SIGMA
}

impl ScenarioFile {
    /// Scenario with every optional field at its default.
    pub fn with_transitions(transitions: Vec<Vec<f64>>) -> Self {
        Self {
            transitions,
            baseline_ticks: None,
            default_duration_ticks: default_duration_ticks(),
            maintenance_interval_ticks: default_maintenance_interval(),
            max_degradation_per_tick: None,
            resource_productivities: None,
            horizon_ticks: default_horizon(),
            arrival_probability: default_arrival_probability(),
            priority_levels: default_priority_levels(),
            dispatch_policy: DispatchPolicy::default(),
            duration_noise_sigma: default_noise_sigma(),
        }
    }

    /// Resolve defaults into a validated `SimConfig`.
    pub fn into_config(self) -> Result<SimConfig> {
        let station_count = self.transitions.len();
        let baselines = match self.baseline_ticks {
            Some(baselines) => {
                if baselines.len() != station_count {
                    bail!(
                        "'baseline_ticks' has {} entries but there are {station_count} stations",
                        baselines.len()
                    );
                }
                baselines
            }
            None => vec![self.default_duration_ticks; station_count],
        };
        let productivities = self
            .resource_productivities
            .unwrap_or_else(|| vec![1.0; station_count]);
        let max_degradation_per_tick = match self.max_degradation_per_tick {
            Some(max) => max,
            None if self.maintenance_interval_ticks > 0 => {
                1.0 / self.maintenance_interval_ticks as f64
            }
            None => 0.0,
        };

        let config = SimConfig {
            stations: self
                .transitions
                .into_iter()
                .zip(baselines)
                .map(|(transitions, baseline_ticks)| StationDef {
                    transitions,
                    baseline_ticks,
                })
                .collect(),
            resources: productivities
                .into_iter()
                .map(|productivity| ResourceDef { productivity })
                .collect(),
            maintenance_interval_ticks: self.maintenance_interval_ticks,
            max_degradation_per_tick,
            horizon_ticks: self.horizon_ticks,
            arrival_probability: self.arrival_probability,
            priority_levels: self.priority_levels,
            dispatch_policy: self.dispatch_policy,
            duration_noise_sigma: self.duration_noise_sigma,
        };
        validate_config(&config).context("invalid scenario")?;
        Ok(config)
    }
}

pub fn load_scenario(path: &Path) -> Result<SimConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario file: {}", path.display()))?;
    let scenario: ScenarioFile = serde_json::from_str(&json)
        .with_context(|| format!("parsing scenario file: {}", path.display()))?;
    scenario
        .into_config()
        .with_context(|| format!("loading scenario file: {}", path.display()))
}

pub fn write_scenario(path: &Path, scenario: &ScenarioFile) -> Result<()> {
    let json = serde_json::to_string_pretty(scenario).context("serializing scenario")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Write `run_info.json` describing one run into `dir`.
pub fn write_run_info(
    dir: &Path,
    run_id: &str,
    seed: u64,
    config: &SimConfig,
    extra: serde_json::Value,
) -> Result<()> {
    let info = serde_json::json!({
        "run_id": run_id,
        "seed": seed,
        "start_time": chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        "horizon_ticks": config.horizon_ticks,
        "station_count": config.stations.len(),
        "resource_count": config.resources.len(),
        "dispatch_policy": config.dispatch_policy,
        "args": extra,
    });
    let path = dir.join("run_info.json");
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &info)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
