//! Order lifecycle bookkeeping.
//!
//! These methods only touch the order itself. Station and resource
//! availability is flipped by the callers that own those arenas.

use crate::{OrderId, OrderState, OrderStatus, ResourceId, StationId};

impl OrderState {
    pub(crate) fn new(
        id: OrderId,
        priority: u32,
        created_tick: u64,
        station_plan: Vec<StationId>,
        time_to_deadline: i64,
    ) -> Self {
        Self {
            id,
            priority,
            created_tick,
            station_plan,
            status: OrderStatus::Idle,
            current_station: None,
            current_resource: None,
            target_duration: None,
            time_to_deadline,
            station_log: Vec::new(),
            resource_log: Vec::new(),
            duration_log: Vec::new(),
            waiting_time_log: vec![0],
            waiting_at_station_log: Vec::new(),
            work_start_log: Vec::new(),
            work_end_log: Vec::new(),
            mean_performance_log: Vec::new(),
            performance_sum: 0.0,
        }
    }

    /// Number of plan slots entered so far, including the current one.
    pub fn visited(&self) -> usize {
        self.station_log.len()
    }

    /// The first plan slot not yet entered.
    pub fn next_planned_station(&self) -> Option<StationId> {
        self.station_plan.get(self.visited()).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.status == OrderStatus::Complete
    }

    /// Occupy `station` for the next plan slot and wait there for a resource.
    pub(crate) fn enter_station(&mut self, station: StationId) {
        self.station_log.push(station);
        self.duration_log.push(0);
        self.waiting_at_station_log.push(0);
        self.current_station = Some(station);
        self.performance_sum = 0.0;
        self.status = OrderStatus::WaitingAtStation;
    }

    pub(crate) fn assign_resource(&mut self, resource: ResourceId) {
        self.resource_log.push(resource);
        self.current_resource = Some(resource);
        self.status = OrderStatus::Working;
    }

    /// Count one tick spent without progress in the current status.
    pub(crate) fn record_wait(&mut self) {
        let slot = match self.status {
            OrderStatus::Idle => self.waiting_time_log.last_mut(),
            OrderStatus::WaitingAtStation => self.waiting_at_station_log.last_mut(),
            OrderStatus::Working | OrderStatus::Complete => None,
        };
        if let Some(ticks) = slot {
            *ticks += 1;
        }
    }

    /// Count one working tick at `performance`. Returns the visit's working ticks so far.
    pub(crate) fn record_work(&mut self, tick: u64, performance: f64) -> u64 {
        let Some(ticks) = self.duration_log.last_mut() else {
            return 0;
        };
        if *ticks == 0 {
            self.work_start_log.push(tick);
        }
        *ticks += 1;
        self.performance_sum += performance;
        *ticks
    }

    /// Leave the current station. Returns the released station and resource.
    ///
    /// The order becomes `Complete` if that was the last planned slot,
    /// otherwise `Idle` with a fresh waiting slot for the next station.
    pub(crate) fn finish_visit(&mut self, tick: u64) -> (Option<StationId>, Option<ResourceId>) {
        let worked = self.duration_log.last().copied().unwrap_or(0);
        let mean_performance = if worked > 0 {
            self.performance_sum / worked as f64
        } else {
            0.0
        };
        self.mean_performance_log.push(mean_performance);
        self.work_end_log.push(tick);
        self.performance_sum = 0.0;
        self.target_duration = None;

        let released = (self.current_station.take(), self.current_resource.take());
        if self.visited() == self.station_plan.len() {
            self.status = OrderStatus::Complete;
        } else {
            self.status = OrderStatus::Idle;
            self.waiting_time_log.push(0);
        }
        released
    }
}
