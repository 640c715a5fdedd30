use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::engine::fare::RateTable;
use crate::models::driver::Driver;
use crate::models::ride::{Ride, RideEvent};
use crate::models::rider::Rider;
use crate::observability::metrics::Metrics;

/// Shared service state.
///
/// Operations that touch more than one entity lock them in the order
/// rider, driver, ride, and never hold a guard across an `.await`.
pub struct AppState {
    pub riders: DashMap<Uuid, Rider>,
    pub drivers: DashMap<Uuid, Driver>,
    pub rides: DashMap<Uuid, Ride>,
    pub rates: RateTable,
    pub ride_events_tx: broadcast::Sender<RideEvent>,
    pub metrics: Metrics,
    driver_seq: AtomicU64,
}

impl AppState {
    pub fn new(rates: RateTable, event_buffer_size: usize) -> Self {
        let (ride_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            riders: DashMap::new(),
            drivers: DashMap::new(),
            rides: DashMap::new(),
            rates,
            ride_events_tx,
            metrics: Metrics::new(),
            driver_seq: AtomicU64::new(0),
        }
    }

    pub(crate) fn next_driver_seq(&self) -> u64 {
        self.driver_seq.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn publish(&self, event: RideEvent) {
        let _ = self.ride_events_tx.send(event);
    }
}
