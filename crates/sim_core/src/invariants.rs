//! Structural consistency checks run after every tick.

use crate::{InvariantViolation, OrderState, OrderStatus, SimState};

pub fn check_invariants(state: &SimState) -> Result<(), InvariantViolation> {
    let mut station_occupants = vec![0_usize; state.stations.len()];
    let mut resource_occupants = vec![0_usize; state.resources.len()];

    for order in &state.orders {
        if order.status == OrderStatus::Complete {
            return Err(status_mismatch(order));
        }
        check_order(order)?;
        if let Some(station) = order.current_station {
            let Some(count) = station_occupants.get_mut(station.index()) else {
                return Err(InvariantViolation::StationNotInPlan {
                    order: order.id,
                    station,
                });
            };
            *count += 1;
        }
        if let Some(resource) = order.current_resource {
            let Some(count) = resource_occupants.get_mut(resource.index()) else {
                return Err(status_mismatch(order));
            };
            *count += 1;
        }
    }

    for order in &state.completed {
        if order.status != OrderStatus::Complete {
            return Err(status_mismatch(order));
        }
        check_order(order)?;
    }

    for (station, occupants) in state.stations.iter().zip(station_occupants) {
        match (station.available, occupants) {
            (true, 0) | (false, 1) => {}
            (false, 0) => {
                return Err(InvariantViolation::OrphanedStation {
                    station: station.id,
                })
            }
            _ => {
                return Err(InvariantViolation::StationOccupancy {
                    station: station.id,
                    occupants,
                })
            }
        }
    }

    for (resource, occupants) in state.resources.iter().zip(resource_occupants) {
        match (resource.available, occupants) {
            (true, 0) | (false, 1) => {}
            (false, 0) => {
                return Err(InvariantViolation::OrphanedResource {
                    resource: resource.id,
                })
            }
            _ => {
                return Err(InvariantViolation::ResourceOccupancy {
                    resource: resource.id,
                    occupants,
                })
            }
        }
    }

    Ok(())
}

fn check_order(order: &OrderState) -> Result<(), InvariantViolation> {
    let visited = order.visited();
    let planned = order.station_plan.len();
    let log_error = |detail: String| InvariantViolation::LogLength {
        order: order.id,
        detail,
    };

    if visited > planned {
        return Err(log_error(format!(
            "{visited} stations visited but only {planned} planned"
        )));
    }
    if order.duration_log.len() != visited || order.waiting_at_station_log.len() != visited {
        return Err(log_error(format!(
            "{visited} visits, {} durations, {} waits at station",
            order.duration_log.len(),
            order.waiting_at_station_log.len()
        )));
    }

    // Idle orders have an open waiting slot for the station they are queued for.
    let (expected_waiting, expected_resources, holds_station, holds_resource) = match order.status
    {
        OrderStatus::Idle => (visited + 1, visited, false, false),
        OrderStatus::WaitingAtStation => (visited, visited.saturating_sub(1), true, false),
        OrderStatus::Working => (visited, visited, true, true),
        OrderStatus::Complete => (planned, visited, false, false),
    };
    if order.waiting_time_log.len() != expected_waiting {
        return Err(log_error(format!(
            "{} waiting slots, expected {expected_waiting}",
            order.waiting_time_log.len()
        )));
    }
    if order.resource_log.len() != expected_resources {
        return Err(log_error(format!(
            "{} resources logged, expected {expected_resources}",
            order.resource_log.len()
        )));
    }
    if order.current_station.is_some() != holds_station
        || order.current_resource.is_some() != holds_resource
    {
        return Err(status_mismatch(order));
    }
    if order.status == OrderStatus::Complete && visited != planned {
        return Err(status_mismatch(order));
    }

    if let Some(station) = order.current_station {
        let slot = visited.checked_sub(1).and_then(|i| order.station_plan.get(i));
        if slot != Some(&station) || order.station_log.last() != Some(&station) {
            return Err(InvariantViolation::StationNotInPlan {
                order: order.id,
                station,
            });
        }
    }
    Ok(())
}

fn status_mismatch(order: &OrderState) -> InvariantViolation {
    InvariantViolation::StatusMismatch {
        order: order.id,
        status: format!("{:?}", order.status),
    }
}
