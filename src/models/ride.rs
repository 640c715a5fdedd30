use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RideError;
use crate::geo::GeoPoint;
use crate::models::vehicle::VehicleKind;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RideStatus {
    Created,
    Started,
    Ended,
    Cancelled,
}

impl RideStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RideStatus::Ended | RideStatus::Cancelled)
    }
}

/// Dispatch input. Never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideRequest {
    pub rider_id: Uuid,
    pub destination: GeoPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    pub id: Uuid,
    pub rider_id: Uuid,
    pub driver_id: Uuid,
    pub vehicle_type: VehicleKind,
    pub license_plate: String,
    pub start_location: GeoPoint,
    pub end_location: GeoPoint,
    pub estimated_fare: Decimal,
    pub status: RideStatus,
    pub rating: Option<u8>,
    pub requested_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Ride {
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), RideError> {
        self.expect_status(RideStatus::Created, "start")?;
        self.status = RideStatus::Started;
        self.started_at = Some(now);
        Ok(())
    }

    /// Checks that the ride may be ended without changing it; settlement runs
    /// between this check and [`Ride::finish`].
    pub fn ensure_can_end(&self) -> Result<(), RideError> {
        self.expect_status(RideStatus::Started, "end")
    }

    pub fn finish(&mut self, rating: u8, now: DateTime<Utc>) -> Result<(), RideError> {
        self.ensure_can_end()?;
        self.status = RideStatus::Ended;
        self.rating = Some(rating);
        self.ended_at = Some(now);
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), RideError> {
        if self.status.is_terminal() {
            return Err(self.invalid_transition("cancel"));
        }
        self.status = RideStatus::Cancelled;
        self.ended_at = Some(now);
        Ok(())
    }

    fn expect_status(&self, expected: RideStatus, action: &'static str) -> Result<(), RideError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(self.invalid_transition(action))
        }
    }

    fn invalid_transition(&self, action: &'static str) -> RideError {
        RideError::InvalidTransition {
            ride: self.id,
            from: self.status,
            action,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RideEventKind {
    Requested,
    Started,
    Ended,
    Cancelled,
}

/// Broadcast to websocket subscribers after each successful transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideEvent {
    pub ride_id: Uuid,
    pub rider_id: Uuid,
    pub driver_id: Uuid,
    pub kind: RideEventKind,
    pub fare: Decimal,
    pub at: DateTime<Utc>,
}

impl RideEvent {
    pub fn new(ride: &Ride, kind: RideEventKind) -> Self {
        Self {
            ride_id: ride.id,
            rider_id: ride.rider_id,
            driver_id: ride.driver_id,
            kind,
            fare: ride.estimated_fare,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::{Ride, RideStatus};
    use crate::error::RideError;
    use crate::geo::GeoPoint;
    use crate::models::vehicle::VehicleKind;

    fn ride() -> Ride {
        Ride {
            id: Uuid::from_u128(7),
            rider_id: Uuid::from_u128(1),
            driver_id: Uuid::from_u128(2),
            vehicle_type: VehicleKind::Car,
            license_plate: "CAR-123".to_string(),
            start_location: GeoPoint::new(10.0, 10.0),
            end_location: GeoPoint::new(15.0, 12.0),
            estimated_fare: dec!(80.78),
            status: RideStatus::Created,
            rating: None,
            requested_at: Utc::now(),
            started_at: None,
            ended_at: None,
        }
    }

    #[test]
    fn moves_forward_through_lifecycle() {
        let mut ride = ride();
        ride.start(Utc::now()).unwrap();
        assert_eq!(ride.status, RideStatus::Started);
        assert!(ride.started_at.is_some());

        ride.finish(5, Utc::now()).unwrap();
        assert_eq!(ride.status, RideStatus::Ended);
        assert_eq!(ride.rating, Some(5));
        assert!(ride.ended_at.is_some());
    }

    #[test]
    fn starting_twice_is_rejected_and_leaves_ride_unchanged() {
        let mut ride = ride();
        ride.start(Utc::now()).unwrap();
        let started_at = ride.started_at;

        let err = ride.start(Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            RideError::InvalidTransition {
                from: RideStatus::Started,
                action: "start",
                ..
            }
        ));
        assert_eq!(ride.status, RideStatus::Started);
        assert_eq!(ride.started_at, started_at);
    }

    #[test]
    fn ending_before_start_is_rejected() {
        let mut ride = ride();
        assert!(ride.ensure_can_end().is_err());
        assert!(ride.finish(5, Utc::now()).is_err());
        assert_eq!(ride.status, RideStatus::Created);
        assert_eq!(ride.rating, None);
    }

    #[test]
    fn terminal_rides_cannot_be_cancelled() {
        let mut ride = ride();
        ride.cancel(Utc::now()).unwrap();
        assert_eq!(ride.status, RideStatus::Cancelled);

        assert!(ride.cancel(Utc::now()).is_err());
        assert!(ride.start(Utc::now()).is_err());
    }
}
