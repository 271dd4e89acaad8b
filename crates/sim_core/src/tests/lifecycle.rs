use super::*;

#[test]
fn test_single_order_walks_the_chain() {
    let config = quiet(chain_config(3));
    let mut state = test_state(&config);
    let mut rng = make_rng();
    let id = push_order(&mut state, 1, 6, &[0, 1, 2]);

    let reports = run_ticks(&mut state, &config, &mut rng, 6);

    assert_eq!(reports[5].completed, vec![id]);
    assert!(state.orders.is_empty());
    let order = find_order(&state, id);
    assert_eq!(order.status, OrderStatus::Complete);
    assert_eq!(
        order.station_log,
        vec![StationId(0), StationId(1), StationId(2)]
    );
    assert_eq!(order.resource_log.len(), 3);
    assert_eq!(order.duration_log, vec![2, 2, 2]);
    assert_eq!(order.waiting_time_log, vec![0, 0, 0]);
    assert_eq!(order.waiting_at_station_log, vec![0, 0, 0]);
    assert_eq!(order.work_start_log, vec![0, 2, 4]);
    assert_eq!(order.work_end_log, vec![1, 3, 5]);
    assert_eq!(order.mean_performance_log, vec![1.0, 1.0, 1.0]);
    assert_eq!(order.time_to_deadline, 0);
    assert_eq!(order.current_station, None);
    assert_eq!(order.target_duration, None);
}

#[test]
fn test_contention_accrues_both_waiting_counters() {
    let config = {
        let mut config = quiet(chain_config(2));
        config.resources.truncate(1);
        config
    };
    let mut state = test_state(&config);
    let mut rng = make_rng();
    let first = push_order(&mut state, 1, 1, &[0, 1]);
    let second = push_order(&mut state, 1, 2, &[0, 1]);

    let reports = run_ticks(&mut state, &config, &mut rng, 8);

    assert_eq!(reports[3].completed, vec![first]);
    assert_eq!(reports[7].completed, vec![second]);

    let first = find_order(&state, first);
    assert_eq!(first.work_end_log, vec![1, 3]);
    assert_eq!(first.waiting_time_log, vec![0, 0]);

    let second = find_order(&state, second);
    // Station 0 is held by the first order on ticks 0 and 1.
    assert_eq!(second.waiting_time_log, vec![2, 0]);
    // The only resource is busy on ticks 2 and 3.
    assert_eq!(second.waiting_at_station_log, vec![2, 0]);
    assert_eq!(second.work_start_log, vec![4, 6]);
    assert_eq!(second.work_end_log, vec![5, 7]);
    assert_eq!(second.duration_log, vec![2, 2]);
}

#[test]
fn test_released_station_is_reused_on_the_next_tick() {
    let config = quiet(single_station_config());
    let mut state = test_state(&config);
    let mut rng = make_rng();
    let id = push_order(&mut state, 1, 2, &[0, 0]);

    let first = tick(&mut state, &config, &mut rng).unwrap();
    assert!(first.completed.is_empty());
    assert_eq!(find_order(&state, id).status, OrderStatus::Idle);
    assert!(state.stations[0].available);

    let second = tick(&mut state, &config, &mut rng).unwrap();
    assert_eq!(second.completed, vec![id]);

    let order = find_order(&state, id);
    assert_eq!(order.station_log, vec![StationId(0), StationId(0)]);
    assert_eq!(order.duration_log, vec![1, 1]);
    assert_eq!(order.work_end_log, vec![0, 1]);
    assert_eq!(order.waiting_time_log, vec![0, 0]);
}

#[test]
fn test_productivity_shortens_service() {
    let mut config = quiet(single_station_config());
    config.stations[0].baseline_ticks = 6;
    config.resources[0].productivity = 2.0;
    let mut state = test_state(&config);
    let mut rng = make_rng();
    let id = push_order(&mut state, 1, 6, &[0]);

    let reports = run_ticks(&mut state, &config, &mut rng, 3);

    assert_eq!(reports[2].completed, vec![id]);
    assert_eq!(find_order(&state, id).duration_log, vec![3]);
}

#[test]
fn test_wear_lowers_recorded_mean_performance() {
    let mut config = quiet(single_station_config());
    config.stations[0].baseline_ticks = 3;
    config.max_degradation_per_tick = 0.5;
    let mut state = test_state(&config);
    let mut rng = make_rng();
    let id = push_order(&mut state, 1, 3, &[0]);

    run_ticks(&mut state, &config, &mut rng, 3);

    let order = find_order(&state, id);
    assert_eq!(order.status, OrderStatus::Complete);
    assert_eq!(order.duration_log, vec![3]);
    let mean = order.mean_performance_log[0];
    assert!(mean > 0.0 && mean < 1.0, "mean performance {mean}");
    assert!(state.stations[0].performance < mean);
}

#[test]
fn test_duration_of_current_visit_never_decreases() {
    let config = branching_config();
    let mut state = test_state(&config);
    let mut rng = make_rng();
    let mut seen: std::collections::HashMap<OrderId, (usize, u64)> =
        std::collections::HashMap::new();

    for _ in 0..config.horizon_ticks {
        tick(&mut state, &config, &mut rng).unwrap();
        for order in &state.orders {
            let Some(&current) = order.duration_log.last() else {
                continue;
            };
            if let Some(&(visited, previous)) = seen.get(&order.id) {
                if visited == order.visited() {
                    assert!(current >= previous, "{} duration went backwards", order.id);
                }
            }
            seen.insert(order.id, (order.visited(), current));
        }
    }
}
