use super::*;

#[test]
fn test_branching_run_holds_invariants_to_horizon() {
    let config = branching_config();
    let mut state = test_state(&config);
    let mut rng = make_rng();

    let mut reports = Vec::new();
    run_to_horizon(&mut state, &config, &mut rng, |_, report| {
        reports.push(report.clone());
    })
    .unwrap();

    assert_eq!(state.meta.tick, config.horizon_ticks);
    assert_eq!(reports.len(), 300);
    assert!(!state.completed.is_empty(), "some orders should finish");
    for (expected_tick, report) in (0..).zip(&reports) {
        assert_eq!(report.tick, expected_tick);
        assert_eq!(report.snapshot.tick, expected_tick);
    }
}

#[test]
fn test_available_plus_busy_equals_total() {
    let config = branching_config();
    let mut state = test_state(&config);
    let mut rng = make_rng();

    for report in run_ticks(&mut state, &config, &mut rng, 150) {
        let snapshot = &report.snapshot;
        assert_eq!(
            snapshot.stations_available + snapshot.stations_busy(),
            config.stations.len()
        );
        assert_eq!(
            snapshot.resources_available + snapshot.resources_busy(),
            config.resources.len()
        );
        assert!(snapshot.stations_busy() <= snapshot.active_orders);
    }
}

#[test]
fn test_visited_slots_never_exceed_plan() {
    let config = branching_config();
    let mut state = test_state(&config);
    let mut rng = make_rng();

    for _ in 0..config.horizon_ticks {
        tick(&mut state, &config, &mut rng).unwrap();
        for order in &state.orders {
            assert!(order.station_log.len() <= order.station_plan.len());
            assert_ne!(order.status, OrderStatus::Complete);
        }
        for order in &state.completed {
            assert_eq!(order.station_log, order.station_plan);
            assert_eq!(order.waiting_time_log.len(), order.station_plan.len());
            assert_eq!(order.work_end_log.len(), order.station_plan.len());
            assert_eq!(order.mean_performance_log.len(), order.station_plan.len());
        }
    }
}

#[test]
fn test_identical_seeds_produce_identical_runs() {
    let config = branching_config();

    let run = |seed: u64| -> String {
        let mut state = build_initial_state(&config, seed).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        run_to_horizon(&mut state, &config, &mut rng, |_, _| {}).unwrap();
        serde_json::to_string(&state).unwrap()
    };

    assert_eq!(run(42), run(42), "identical seeds must produce identical runs");
}

#[test]
fn test_different_seeds_produce_different_results() {
    let config = branching_config();

    let completed = |seed: u64| -> Vec<Vec<StationId>> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let state = simulate(&config, seed, &mut rng).unwrap();
        state
            .completed
            .iter()
            .map(|order| order.station_plan.clone())
            .collect()
    };

    assert_ne!(
        completed(42),
        completed(1234),
        "different seeds should generally produce different results"
    );
}

#[test]
fn test_simulate_rejects_invalid_config() {
    let mut config = chain_config(2);
    config.horizon_ticks = 0;
    let mut rng = make_rng();

    let err = simulate(&config, 1, &mut rng).unwrap_err();
    assert_eq!(err, SimError::Config(ConfigError::ZeroHorizon));
}

#[test]
fn test_corrupted_state_aborts_tick() {
    let config = quiet(chain_config(2));
    let mut state = test_state(&config);
    let mut rng = make_rng();
    state.stations[1].available = false;

    let err = tick(&mut state, &config, &mut rng).unwrap_err();
    assert_eq!(
        err,
        InvariantViolation::OrphanedStation {
            station: StationId(1)
        }
    );
    assert_eq!(state.meta.tick, 0, "a failed tick does not advance time");
}
