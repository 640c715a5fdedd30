use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::settlement::{Settlement, settle};
use crate::error::RideError;
use crate::models::driver::Driver;
use crate::models::ride::{Ride, RideEvent, RideEventKind};
use crate::models::rider::Rider;
use crate::models::vehicle::VehicleStatus;
use crate::state::AppState;

pub fn start_ride(state: &AppState, ride_id: Uuid) -> Result<Ride, RideError> {
    let result = state
        .rides
        .get_mut(&ride_id)
        .ok_or(RideError::RideNotFound(ride_id))
        .and_then(|mut ride| {
            ride.start(Utc::now())?;
            Ok(ride.clone())
        });

    state.metrics.record_transition("start", result.is_ok());
    match &result {
        Ok(ride) => {
            state.publish(RideEvent::new(ride, RideEventKind::Started));
            info!(ride_id = %ride.id, driver_id = %ride.driver_id, "ride started");
        }
        Err(err) => warn!(%ride_id, error = %err, "ride start rejected"),
    }
    result
}

/// Ends a started ride: settles the fare, records the rating and returns the
/// driver to the pool. On error the ride stays `Started` and no money moves.
pub fn end_ride(
    state: &AppState,
    ride_id: Uuid,
    rating: i64,
) -> Result<(Ride, Settlement), RideError> {
    let result = finish(state, ride_id, rating);

    state.metrics.record_transition("end", result.is_ok());
    match &result {
        Ok((ride, settlement)) => {
            state.metrics.drivers_available.inc();
            state
                .metrics
                .fares_settled_total
                .inc_by(settlement.fare.to_f64().unwrap_or_default());
            state.publish(RideEvent::new(ride, RideEventKind::Ended));
            info!(
                ride_id = %ride.id,
                driver_id = %ride.driver_id,
                fare = %settlement.fare,
                rating = settlement.rating,
                "ride ended"
            );
        }
        Err(err) => warn!(%ride_id, error = %err, "ride end rejected"),
    }
    result
}

/// Cancels a ride that has not finished. The driver is released; no money
/// moves and no rating is recorded.
pub fn cancel_ride(state: &AppState, ride_id: Uuid) -> Result<Ride, RideError> {
    let result = with_participants(state, ride_id, |rider, driver, ride| {
        let now = Utc::now();
        ride.cancel(now)?;
        release(rider, driver, now);
        Ok(ride.clone())
    });

    state.metrics.record_transition("cancel", result.is_ok());
    match &result {
        Ok(ride) => {
            state.metrics.drivers_available.inc();
            state.publish(RideEvent::new(ride, RideEventKind::Cancelled));
            info!(ride_id = %ride.id, driver_id = %ride.driver_id, "ride cancelled");
        }
        Err(err) => warn!(%ride_id, error = %err, "ride cancel rejected"),
    }
    result
}

fn finish(state: &AppState, ride_id: Uuid, rating: i64) -> Result<(Ride, Settlement), RideError> {
    with_participants(state, ride_id, |rider, driver, ride| {
        ride.ensure_can_end()?;
        let settlement = settle(rider, driver, ride.estimated_fare, rating)?;

        let now = Utc::now();
        ride.finish(settlement.rating, now)?;
        release(rider, driver, now);
        Ok((ride.clone(), settlement))
    })
}

/// Runs `op` with exclusive access to the ride and both of its participants,
/// locked in rider, driver, ride order.
fn with_participants<T>(
    state: &AppState,
    ride_id: Uuid,
    op: impl FnOnce(&mut Rider, &mut Driver, &mut Ride) -> Result<T, RideError>,
) -> Result<T, RideError> {
    let (rider_id, driver_id) = {
        let ride = state
            .rides
            .get(&ride_id)
            .ok_or(RideError::RideNotFound(ride_id))?;
        (ride.rider_id, ride.driver_id)
    };

    let mut rider = state
        .riders
        .get_mut(&rider_id)
        .ok_or(RideError::RiderNotFound(rider_id))?;
    let mut driver = state
        .drivers
        .get_mut(&driver_id)
        .ok_or(RideError::DriverNotFound(driver_id))?;
    let mut ride = state
        .rides
        .get_mut(&ride_id)
        .ok_or(RideError::RideNotFound(ride_id))?;

    if !ride.status.is_terminal()
        && (rider.active_ride != Some(ride_id) || driver.active_ride != Some(ride_id))
    {
        return Err(RideError::InconsistentState(format!(
            "ride {ride_id} is not the active ride of its participants"
        )));
    }

    op(&mut rider, &mut driver, &mut ride)
}

fn release(rider: &mut Rider, driver: &mut Driver, now: DateTime<Utc>) {
    driver.vehicle.status = VehicleStatus::Available;
    driver.active_ride = None;
    driver.updated_at = now;
    rider.active_ride = None;
    rider.updated_at = now;
}
