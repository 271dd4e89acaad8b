use std::collections::{BTreeSet, VecDeque};

use crate::{StationDef, StationId};

/// Returns every station a route can visit when it starts at `from`, following
/// positive-weight transitions. Expansion does not continue past `stop`, since
/// a route ends as soon as it reaches it. `from` is always included.
pub fn reachable_stations(
    from: StationId,
    stop: StationId,
    stations: &[StationDef],
) -> BTreeSet<StationId> {
    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::new();
    visited.insert(from);
    queue.push_back(from);
    while let Some(node) = queue.pop_front() {
        if node == stop {
            continue;
        }
        let Some(def) = stations.get(node.index()) else {
            continue;
        };
        for (target, weight) in def.transitions.iter().enumerate() {
            let neighbor = StationId(target);
            if *weight > 0.0 && visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }
    visited
}

/// Returns every station with a positive-weight path to `to`, `to` included.
pub fn stations_reaching(to: StationId, stations: &[StationDef]) -> BTreeSet<StationId> {
    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::new();
    visited.insert(to);
    queue.push_back(to);
    while let Some(node) = queue.pop_front() {
        for (source, def) in stations.iter().enumerate() {
            let predecessor = StationId(source);
            let leads_here = def
                .transitions
                .get(node.index())
                .is_some_and(|weight| *weight > 0.0);
            if leads_here && visited.insert(predecessor) {
                queue.push_back(predecessor);
            }
        }
    }
    visited
}
