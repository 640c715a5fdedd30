//! Participant registration and the bookkeeping operations riders and
//! drivers perform outside of a ride.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, RideError};
use crate::geo::GeoPoint;
use crate::models::driver::{Driver, DriverProfile};
use crate::models::ride::Ride;
use crate::models::rider::Rider;
use crate::models::vehicle::{Vehicle, VehicleKind};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct NewRider {
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub location: GeoPoint,
    #[serde(default)]
    pub wallet: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDriver {
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub location: GeoPoint,
    pub vehicle_type: VehicleKind,
    pub license_plate: String,
}

pub fn register_rider(state: &AppState, new: NewRider) -> Result<Rider, AppError> {
    ensure_named(&new.name)?;
    ensure_finite(&new.location)?;
    if new.wallet < Decimal::ZERO {
        return Err(RideError::InvalidAmount(new.wallet).into());
    }

    let rider = Rider {
        id: Uuid::new_v4(),
        name: new.name,
        email: new.email,
        location: new.location,
        wallet: new.wallet,
        active_ride: None,
        updated_at: Utc::now(),
    };

    state.riders.insert(rider.id, rider.clone());
    info!(rider_id = %rider.id, wallet = %rider.wallet, "rider registered");
    Ok(rider)
}

pub fn register_driver(state: &AppState, new: NewDriver) -> Result<Driver, AppError> {
    ensure_named(&new.name)?;
    ensure_finite(&new.location)?;
    if new.license_plate.trim().is_empty() {
        return Err(AppError::BadRequest("license_plate cannot be empty".to_string()));
    }

    let rate = state.rates.rate_for(new.vehicle_type);
    let driver = Driver {
        id: Uuid::new_v4(),
        seq: state.next_driver_seq(),
        name: new.name,
        email: new.email,
        location: new.location,
        vehicle: Vehicle::new(new.vehicle_type, new.license_plate, rate),
        wallet: Decimal::ZERO,
        ratings: Vec::new(),
        active_ride: None,
        updated_at: Utc::now(),
    };

    state.drivers.insert(driver.id, driver.clone());
    state.metrics.drivers_available.inc();
    info!(driver_id = %driver.id, vehicle = ?driver.vehicle.kind, %rate, "driver registered");
    Ok(driver)
}

/// Tops up a rider's wallet. Only positive amounts are accepted.
pub fn load_cash(state: &AppState, rider_id: Uuid, amount: Decimal) -> Result<Rider, RideError> {
    if amount <= Decimal::ZERO {
        return Err(RideError::InvalidAmount(amount));
    }

    let mut rider = state
        .riders
        .get_mut(&rider_id)
        .ok_or(RideError::RiderNotFound(rider_id))?;

    rider.wallet = rider
        .wallet
        .checked_add(amount)
        .ok_or(RideError::ArithmeticOverflow {
            operation: "top-up",
            party: rider_id,
        })?;
    rider.updated_at = Utc::now();

    Ok(rider.clone())
}

pub fn update_rider_location(
    state: &AppState,
    rider_id: Uuid,
    location: GeoPoint,
) -> Result<Rider, RideError> {
    ensure_finite(&location)?;

    let mut rider = state
        .riders
        .get_mut(&rider_id)
        .ok_or(RideError::RiderNotFound(rider_id))?;
    rider.location = location;
    rider.updated_at = Utc::now();

    Ok(rider.clone())
}

pub fn update_driver_location(
    state: &AppState,
    driver_id: Uuid,
    location: GeoPoint,
) -> Result<Driver, RideError> {
    ensure_finite(&location)?;

    let mut driver = state
        .drivers
        .get_mut(&driver_id)
        .ok_or(RideError::DriverNotFound(driver_id))?;
    driver.location = location;
    driver.updated_at = Utc::now();

    Ok(driver.clone())
}

pub fn driver_profile(state: &AppState, driver_id: Uuid) -> Result<DriverProfile, RideError> {
    state
        .drivers
        .get(&driver_id)
        .map(|driver| driver.profile())
        .ok_or(RideError::DriverNotFound(driver_id))
}

pub fn get_rider(state: &AppState, rider_id: Uuid) -> Result<Rider, RideError> {
    state
        .riders
        .get(&rider_id)
        .map(|rider| rider.value().clone())
        .ok_or(RideError::RiderNotFound(rider_id))
}

pub fn get_ride(state: &AppState, ride_id: Uuid) -> Result<Ride, RideError> {
    state
        .rides
        .get(&ride_id)
        .map(|ride| ride.value().clone())
        .ok_or(RideError::RideNotFound(ride_id))
}

pub(crate) fn ensure_finite(location: &GeoPoint) -> Result<(), RideError> {
    if location.is_finite() {
        Ok(())
    } else {
        Err(RideError::InvalidLocation {
            x: location.x,
            y: location.y,
        })
    }
}

fn ensure_named(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::{
        NewDriver, NewRider, driver_profile, load_cash, register_driver, register_rider,
        update_driver_location,
    };
    use crate::engine::fare::RateTable;
    use crate::error::{AppError, RideError};
    use crate::geo::GeoPoint;
    use crate::models::vehicle::{VehicleKind, VehicleStatus};
    use crate::state::AppState;

    fn new_rider(name: &str) -> NewRider {
        NewRider {
            name: name.to_string(),
            email: "alice@example.com".to_string(),
            location: GeoPoint::new(10.0, 10.0),
            wallet: dec!(500),
        }
    }

    fn new_driver(kind: VehicleKind) -> NewDriver {
        NewDriver {
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            location: GeoPoint::new(11.0, 10.0),
            vehicle_type: kind,
            license_plate: "CAR-123".to_string(),
        }
    }

    #[test]
    fn driver_gets_rate_from_table_and_starts_available() {
        let state = AppState::new(RateTable::default(), 16);

        let car = register_driver(&state, new_driver(VehicleKind::Car)).unwrap();
        let cng = register_driver(&state, new_driver(VehicleKind::Cng)).unwrap();

        assert_eq!(car.vehicle.rate, dec!(15));
        assert_eq!(cng.vehicle.rate, dec!(5));
        assert_eq!(car.vehicle.status, VehicleStatus::Available);
        assert!(car.seq < cng.seq);
        assert_eq!(state.metrics.drivers_available.get(), 2);
    }

    #[test]
    fn blank_name_is_rejected() {
        let state = AppState::new(RateTable::default(), 16);
        let err = register_rider(&state, new_rider("  ")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(state.riders.is_empty());
    }

    #[test]
    fn negative_opening_balance_is_rejected() {
        let state = AppState::new(RateTable::default(), 16);
        let mut rider = new_rider("Alice");
        rider.wallet = dec!(-1);

        let err = register_rider(&state, rider).unwrap_err();
        assert!(matches!(err, AppError::Ride(RideError::InvalidAmount(amount)) if amount == dec!(-1)));
        assert!(state.riders.is_empty());
    }

    #[test]
    fn top_up_requires_positive_amount() {
        let state = AppState::new(RateTable::default(), 16);
        let rider = register_rider(&state, new_rider("Alice")).unwrap();

        assert_eq!(
            load_cash(&state, rider.id, dec!(0)).unwrap_err(),
            RideError::InvalidAmount(dec!(0))
        );
        let topped = load_cash(&state, rider.id, dec!(25.50)).unwrap();
        assert_eq!(topped.wallet, dec!(525.50));
    }

    #[test]
    fn location_update_validates_and_applies() {
        let state = AppState::new(RateTable::default(), 16);
        let driver = register_driver(&state, new_driver(VehicleKind::Bike)).unwrap();

        assert!(matches!(
            update_driver_location(&state, driver.id, GeoPoint::new(f64::NAN, 0.0)),
            Err(RideError::InvalidLocation { .. })
        ));
        let moved = update_driver_location(&state, driver.id, GeoPoint::new(3.0, 4.0)).unwrap();
        assert_eq!(moved.location, GeoPoint::new(3.0, 4.0));
    }

    #[test]
    fn profile_of_unknown_driver_is_not_found() {
        let state = AppState::new(RateTable::default(), 16);
        let ghost = Uuid::from_u128(5);
        assert_eq!(
            driver_profile(&state, ghost).unwrap_err(),
            RideError::DriverNotFound(ghost)
        );
    }
}
