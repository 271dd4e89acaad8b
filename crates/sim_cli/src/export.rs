//! Event-log, enterprise-log and parameter CSV export.
//!
//! Timestamps are reconstructed from tick counts: tick 0 is
//! 2020-01-01 00:00:00 UTC and one tick is one second.

use anyhow::{Context, Result};
use chrono::DateTime;
use serde::Serialize;
use sim_core::{OrderState, ResourceId, ResourceState, SimConfig, StationId, TickSnapshot};
use std::collections::BTreeSet;
use std::path::Path;

/// 2020-01-01T00:00:00Z.
pub const EPOCH_UNIX_SECONDS: i64 = 1_577_836_800;

pub fn format_tick(tick: u64) -> String {
    i64::try_from(tick)
        .ok()
        .and_then(|tick| EPOCH_UNIX_SECONDS.checked_add(tick))
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

/// One finished station visit with its reconstructed tick boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    pub order: String,
    pub station: String,
    pub resource: String,
    pub resource_productivity: f64,
    pub mean_performance: f64,
    pub waiting_time: u64,
    pub waiting_time_at_station: u64,
    pub duration: u64,
    pub tick_in: u64,
    pub tick_at_station: u64,
    pub tick_start_work: u64,
    pub tick_out: u64,
}

/// Expand completed orders into visits, in completion order.
///
/// Each visit starts where the previous one ended (the first at the order's
/// creation tick), then adds the waiting, waiting-at-station and working
/// ticks logged for that slot.
pub fn reconstruct_visits(completed: &[OrderState], resources: &[ResourceState]) -> Vec<Visit> {
    let mut visits = Vec::new();
    for order in completed {
        let mut tick_in = order.created_tick;
        for (slot, station) in order.station_log.iter().enumerate() {
            let resource = order.resource_log.get(slot);
            let waiting_time = order.waiting_time_log.get(slot).copied().unwrap_or(0);
            let waiting_time_at_station =
                order.waiting_at_station_log.get(slot).copied().unwrap_or(0);
            let duration = order.duration_log.get(slot).copied().unwrap_or(0);

            let tick_at_station = tick_in + waiting_time;
            let tick_start_work = tick_at_station + waiting_time_at_station;
            let tick_out = tick_start_work + duration;

            visits.push(Visit {
                order: order.id.to_string(),
                station: station.to_string(),
                resource: resource.map(ToString::to_string).unwrap_or_default(),
                resource_productivity: resource
                    .and_then(|id| resources.get(id.index()))
                    .map_or(0.0, |r| r.productivity),
                mean_performance: order.mean_performance_log.get(slot).copied().unwrap_or(0.0),
                waiting_time,
                waiting_time_at_station,
                duration,
                tick_in,
                tick_at_station,
                tick_start_work,
                tick_out,
            });
            tick_in = tick_out;
        }
    }
    visits
}

/// Every tick that appears as some visit boundary.
pub fn event_ticks(visits: &[Visit]) -> BTreeSet<u64> {
    visits
        .iter()
        .flat_map(|v| [v.tick_in, v.tick_at_station, v.tick_start_work, v.tick_out])
        .collect()
}

#[derive(Debug, Serialize)]
struct EventRow<'a> {
    order_id: &'a str,
    station: &'a str,
    mean_performance: f64,
    resource: &'a str,
    resource_productivity: f64,
    waiting_time: u64,
    waiting_time_at_station: u64,
    duration: u64,
    timestamp_in: String,
    timestamp_at_station: String,
    timestamp_start_work: String,
    timestamp_out: String,
}

impl<'a> From<&'a Visit> for EventRow<'a> {
    fn from(visit: &'a Visit) -> Self {
        Self {
            order_id: &visit.order,
            station: &visit.station,
            mean_performance: visit.mean_performance,
            resource: &visit.resource,
            resource_productivity: visit.resource_productivity,
            waiting_time: visit.waiting_time,
            waiting_time_at_station: visit.waiting_time_at_station,
            duration: visit.duration,
            timestamp_in: format_tick(visit.tick_in),
            timestamp_at_station: format_tick(visit.tick_at_station),
            timestamp_start_work: format_tick(visit.tick_start_work),
            timestamp_out: format_tick(visit.tick_out),
        }
    }
}

pub fn write_event_log(path: &Path, visits: &[Visit]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for visit in visits {
        writer
            .serialize(EventRow::from(visit))
            .with_context(|| format!("writing {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Enterprise log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct EnterpriseRow {
    tick: u64,
    stations_available: usize,
    resources_available: usize,
    existing_orders: usize,
    /// Stations first, then resources.
    availability: Vec<bool>,
}

/// Per-tick occupancy, buffered until the run ends so it can be filtered
/// down to the ticks the event log refers to.
#[derive(Debug, Clone)]
pub struct EnterpriseLog {
    station_count: usize,
    resource_count: usize,
    rows: Vec<EnterpriseRow>,
}

impl EnterpriseLog {
    pub fn new(station_count: usize, resource_count: usize) -> Self {
        Self {
            station_count,
            resource_count,
            rows: Vec::new(),
        }
    }

    pub fn record(&mut self, snapshot: &TickSnapshot) {
        let mut availability = Vec::with_capacity(self.station_count + self.resource_count);
        availability.extend_from_slice(&snapshot.station_available);
        availability.extend_from_slice(&snapshot.resource_available);
        self.rows.push(EnterpriseRow {
            tick: snapshot.tick,
            stations_available: snapshot.stations_available,
            resources_available: snapshot.resources_available,
            existing_orders: snapshot.active_orders,
            availability,
        });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn header(&self) -> Vec<String> {
        let mut header = vec![
            "timestamp".to_string(),
            "stations_available".to_string(),
            "resources_available".to_string(),
            "existing_orders".to_string(),
        ];
        // Same names as the event log's station and resource cells.
        header.extend(
            (0..self.station_count).map(|idx| format!("{}_available", StationId(idx))),
        );
        header.extend(
            (0..self.resource_count).map(|idx| format!("{}_available", ResourceId(idx))),
        );
        header
    }

    /// Write recorded ticks to `path`. With `only_ticks`, rows for other
    /// ticks are skipped. Returns the number of rows written.
    pub fn write(&self, path: &Path, only_ticks: Option<&BTreeSet<u64>>) -> Result<usize> {
        let mut writer =
            csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
        writer
            .write_record(self.header())
            .with_context(|| format!("writing {}", path.display()))?;

        let mut written = 0;
        for row in &self.rows {
            if only_ticks.is_some_and(|ticks| !ticks.contains(&row.tick)) {
                continue;
            }
            let mut record = vec![
                format_tick(row.tick),
                row.stations_available.to_string(),
                row.resources_available.to_string(),
                row.existing_orders.to_string(),
            ];
            record.extend(row.availability.iter().map(ToString::to_string));
            writer
                .write_record(&record)
                .with_context(|| format!("writing {}", path.display()))?;
            written += 1;
        }
        writer
            .flush()
            .with_context(|| format!("flushing {}", path.display()))?;
        Ok(written)
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct StationParams {
    station_name: String,
    station_duration_baseline: u64,
    /// Semicolon-separated transition row.
    station_transitions: String,
}

#[derive(Debug, Serialize)]
struct ResourceParams {
    resource_name: String,
    resource_productivity: f64,
}

/// Write `stations.csv` and `resources.csv` describing `config` into `dir`.
pub fn write_parameters(dir: &Path, config: &SimConfig) -> Result<()> {
    let path = dir.join("stations.csv");
    let mut writer =
        csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
    for (idx, station) in config.stations.iter().enumerate() {
        let transitions: Vec<String> = station.transitions.iter().map(f64::to_string).collect();
        writer
            .serialize(StationParams {
                station_name: StationId(idx).to_string(),
                station_duration_baseline: station.baseline_ticks,
                station_transitions: transitions.join(";"),
            })
            .with_context(|| format!("writing {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))?;

    let path = dir.join("resources.csv");
    let mut writer =
        csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
    for (idx, resource) in config.resources.iter().enumerate() {
        writer
            .serialize(ResourceParams {
                resource_name: ResourceId(idx).to_string(),
                resource_productivity: resource.productivity,
            })
            .with_context(|| format!("writing {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sim_core::test_fixtures::{chain_config, single_station_config};
    use sim_core::{build_initial_state, run_to_horizon, SimState};

    fn finished_run(config: &SimConfig) -> (SimState, EnterpriseLog) {
        let mut state = build_initial_state(config, 42).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut log = EnterpriseLog::new(config.stations.len(), config.resources.len());
        run_to_horizon(&mut state, config, &mut rng, |_, report| {
            log.record(&report.snapshot);
        })
        .unwrap();
        (state, log)
    }

    fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader.records().map(Result::unwrap).collect()
    }

    #[test]
    fn test_format_tick_counts_seconds_from_epoch() {
        assert_eq!(format_tick(0), "2020-01-01 00:00:00");
        assert_eq!(format_tick(61), "2020-01-01 00:01:01");
        assert_eq!(format_tick(86_400), "2020-01-02 00:00:00");
    }

    #[test]
    fn test_visits_chain_from_creation_tick() {
        let mut config = single_station_config();
        config.stations[0].baseline_ticks = 2;
        let (state, _) = finished_run(&config);

        let visits = reconstruct_visits(&state.completed, &state.resources);
        assert_eq!(visits.len(), state.completed.len());

        let second = &visits[1];
        assert_eq!(second.order, "order_0002");
        assert_eq!(second.station, "station_0000");
        assert_eq!(second.resource, "resource_0000");
        assert_eq!(second.tick_in, 1);
        assert_eq!(second.waiting_time, 1);
        assert_eq!(second.tick_at_station, 2);
        assert_eq!(second.tick_start_work, 2);
        assert_eq!(second.tick_out, 4);
        assert!((second.resource_productivity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_multi_stop_visits_agree_with_work_logs() {
        let mut config = chain_config(3);
        config.arrival_probability = 0.2;
        let (state, _) = finished_run(&config);
        assert!(!state.completed.is_empty());

        let visits = reconstruct_visits(&state.completed, &state.resources);
        let mut cursor = 0;
        for order in &state.completed {
            let slots = order.station_log.len();
            let order_visits = &visits[cursor..cursor + slots];
            for (slot, visit) in order_visits.iter().enumerate() {
                assert_eq!(visit.tick_start_work, order.work_start_log[slot]);
                assert_eq!(visit.tick_out, order.work_end_log[slot] + 1);
            }
            assert_eq!(order_visits[0].tick_in, order.created_tick);
            cursor += slots;
        }
    }

    #[test]
    fn test_event_log_has_expected_columns() {
        let config = single_station_config();
        let (state, _) = finished_run(&config);
        let visits = reconstruct_visits(&state.completed, &state.resources);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event_log.csv");

        write_event_log(&path, &visits).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(
            header,
            [
                "order_id",
                "station",
                "mean_performance",
                "resource",
                "resource_productivity",
                "waiting_time",
                "waiting_time_at_station",
                "duration",
                "timestamp_in",
                "timestamp_at_station",
                "timestamp_start_work",
                "timestamp_out",
            ]
        );
        let rows = read_rows(&path);
        assert_eq!(rows.len(), 10);
        assert_eq!(&rows[0][0], "order_0001");
        assert_eq!(&rows[0][8], "2020-01-01 00:00:00");
        assert_eq!(&rows[0][11], "2020-01-01 00:00:01");
    }

    #[test]
    fn test_enterprise_log_filters_to_event_ticks() {
        let mut config = single_station_config();
        config.stations[0].baseline_ticks = 2;
        config.horizon_ticks = 20;
        config.arrival_probability = 0.0;
        let (state, log) = finished_run(&config);
        assert!(state.completed.is_empty());
        assert_eq!(log.len(), 20);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enterprise_log.csv");
        let only: BTreeSet<u64> = [0, 3, 19, 40].into_iter().collect();

        assert_eq!(log.write(&path, Some(&only)).unwrap(), 3);
        let rows = read_rows(&path);
        let stamps: Vec<&str> = rows.iter().map(|row| &row[0]).collect();
        assert_eq!(
            stamps,
            [
                "2020-01-01 00:00:00",
                "2020-01-01 00:00:03",
                "2020-01-01 00:00:19"
            ]
        );

        assert_eq!(log.write(&path, None).unwrap(), 20);
    }

    #[test]
    fn test_enterprise_log_columns_per_station_and_resource() {
        let config = chain_config(2);
        let (_, log) = finished_run(&config);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enterprise_log.csv");

        log.write(&path, None).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(
            header,
            [
                "timestamp",
                "stations_available",
                "resources_available",
                "existing_orders",
                "station_0000_available",
                "station_0001_available",
                "resource_0000_available",
                "resource_0001_available",
            ]
        );
        let first = reader.records().next().unwrap().unwrap();
        assert_eq!(&first[1], "2");
        assert_eq!(&first[4], "true");
    }

    #[test]
    fn test_event_log_names_match_enterprise_columns() {
        let config = single_station_config();
        let (state, log) = finished_run(&config);
        let visits = reconstruct_visits(&state.completed, &state.resources);
        let header = log.header();

        assert!(!visits.is_empty());
        for visit in &visits {
            assert!(header.contains(&format!("{}_available", visit.station)));
            assert!(header.contains(&format!("{}_available", visit.resource)));
        }
    }

    #[test]
    fn test_parameter_files() {
        let config = chain_config(3);
        let dir = tempfile::tempdir().unwrap();

        write_parameters(dir.path(), &config).unwrap();

        let stations = read_rows(&dir.path().join("stations.csv"));
        assert_eq!(stations.len(), 3);
        assert_eq!(&stations[0][0], "station_0000");
        assert_eq!(&stations[0][1], "2");
        assert_eq!(&stations[0][2], "0;1;0");
        let resources = read_rows(&dir.path().join("resources.csv"));
        assert_eq!(resources.len(), 3);
        assert_eq!(&resources[2][0], "resource_0002");
    }

    #[test]
    fn test_event_ticks_collects_every_boundary() {
        let visit = Visit {
            order: "order_0001".to_string(),
            station: "station_0000".to_string(),
            resource: "resource_0000".to_string(),
            resource_productivity: 1.0,
            mean_performance: 1.0,
            waiting_time: 2,
            waiting_time_at_station: 1,
            duration: 4,
            tick_in: 10,
            tick_at_station: 12,
            tick_start_work: 13,
            tick_out: 17,
        };
        let ticks: Vec<u64> = event_ticks(&[visit]).into_iter().collect();
        assert_eq!(ticks, vec![10, 12, 13, 17]);
    }
}
