use std::time::Instant;

use chrono::Utc;
use dashmap::DashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::fare::fare;
use crate::engine::registry::ensure_finite;
use crate::error::RideError;
use crate::geo::{GeoPoint, distance};
use crate::models::driver::Driver;
use crate::models::ride::{Ride, RideEvent, RideEventKind, RideRequest, RideStatus};
use crate::models::vehicle::VehicleStatus;
use crate::state::AppState;

/// Snapshot of an available driver taken at the start of a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub driver_id: Uuid,
    pub seq: u64,
    pub location: GeoPoint,
}

/// Picks the candidate closest to `origin`.
///
/// Ties go to the candidate that appears first in `candidates`.
pub fn nearest_driver<'a>(
    origin: &GeoPoint,
    candidates: &'a [Candidate],
) -> Option<(&'a Candidate, f64)> {
    let mut best: Option<(&Candidate, f64)> = None;

    for candidate in candidates {
        let d = distance(origin, &candidate.location);
        match best {
            Some((_, best_distance)) if d >= best_distance => {}
            _ => best = Some((candidate, d)),
        }
    }

    best
}

/// Available drivers in registration order.
pub fn available_candidates(drivers: &DashMap<Uuid, Driver>) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = drivers
        .iter()
        .filter(|entry| entry.value().vehicle.is_available())
        .map(|entry| {
            let driver = entry.value();
            Candidate {
                driver_id: driver.id,
                seq: driver.seq,
                location: driver.location,
            }
        })
        .collect();

    candidates.sort_by_key(|candidate| candidate.seq);
    candidates
}

/// Matches the rider with the nearest available driver and creates the ride.
///
/// Either one driver is reserved and one ride is returned, or nothing changes.
pub fn request_ride(state: &AppState, request: RideRequest) -> Result<Ride, RideError> {
    let start = Instant::now();
    let result = reserve(state, &request);
    let elapsed = start.elapsed().as_secs_f64();

    let outcome = match &result {
        Ok(_) => "matched",
        Err(RideError::NoAvailableDriver) => "no_driver",
        Err(_) => "rejected",
    };
    state
        .metrics
        .dispatch_latency_seconds
        .with_label_values(&[outcome])
        .observe(elapsed);
    state
        .metrics
        .ride_requests_total
        .with_label_values(&[outcome])
        .inc();

    match result {
        Ok((ride, pickup_distance)) => {
            state.metrics.drivers_available.dec();
            state.publish(RideEvent::new(&ride, RideEventKind::Requested));
            info!(
                ride_id = %ride.id,
                rider_id = %ride.rider_id,
                driver_id = %ride.driver_id,
                pickup_distance,
                fare = %ride.estimated_fare,
                "ride matched"
            );
            Ok(ride)
        }
        Err(err) => {
            warn!(rider_id = %request.rider_id, error = %err, "ride request rejected");
            Err(err)
        }
    }
}

fn reserve(state: &AppState, request: &RideRequest) -> Result<(Ride, f64), RideError> {
    ensure_finite(&request.destination)?;

    let mut rider = state
        .riders
        .get_mut(&request.rider_id)
        .ok_or(RideError::RiderNotFound(request.rider_id))?;

    if let Some(active) = rider.active_ride {
        return Err(RideError::RiderHasActiveRide {
            rider: rider.id,
            ride: active,
        });
    }

    let origin = rider.location;
    let mut candidates = available_candidates(&state.drivers);

    loop {
        let (driver_id, pickup_distance) = nearest_driver(&origin, &candidates)
            .map(|(candidate, d)| (candidate.driver_id, d))
            .ok_or(RideError::NoAvailableDriver)?;

        let mut driver = match state.drivers.get_mut(&driver_id) {
            Some(driver) if driver.vehicle.is_available() => driver,
            _ => {
                // Taken by a concurrent dispatch since the snapshot.
                candidates.retain(|candidate| candidate.driver_id != driver_id);
                continue;
            }
        };

        let estimated_fare = fare(&origin, &request.destination, driver.vehicle.rate)?;
        let now = Utc::now();

        let ride = Ride {
            id: Uuid::new_v4(),
            rider_id: rider.id,
            driver_id,
            vehicle_type: driver.vehicle.kind,
            license_plate: driver.vehicle.license_plate.clone(),
            start_location: origin,
            end_location: request.destination,
            estimated_fare,
            status: RideStatus::Created,
            rating: None,
            requested_at: now,
            started_at: None,
            ended_at: None,
        };

        driver.vehicle.status = VehicleStatus::Unavailable;
        driver.active_ride = Some(ride.id);
        driver.updated_at = now;
        rider.active_ride = Some(ride.id);
        rider.updated_at = now;
        state.rides.insert(ride.id, ride.clone());

        return Ok((ride, pickup_distance));
    }
}
