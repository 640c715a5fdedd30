use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;
use crate::models::vehicle::{Vehicle, VehicleKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    /// Registration order; the dispatch tie-break prefers lower values.
    pub seq: u64,
    pub name: String,
    pub email: String,
    pub location: GeoPoint,
    pub vehicle: Vehicle,
    pub wallet: Decimal,
    pub ratings: Vec<u8>,
    pub active_ride: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl Driver {
    /// Mean of all recorded ratings, `None` until the first rated ride.
    pub fn average_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }

        let sum: u32 = self.ratings.iter().map(|&r| u32::from(r)).sum();
        Some(f64::from(sum) / self.ratings.len() as f64)
    }

    pub fn profile(&self) -> DriverProfile {
        DriverProfile {
            id: self.id,
            name: self.name.clone(),
            average_rating: self.average_rating(),
            vehicle_type: self.vehicle.kind,
            license_plate: self.vehicle.license_plate.clone(),
            rides_completed: self.ratings.len(),
            wallet: self.wallet,
        }
    }
}

/// Read-only projection of a driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverProfile {
    pub id: Uuid,
    pub name: String,
    pub average_rating: Option<f64>,
    pub vehicle_type: VehicleKind,
    pub license_plate: String,
    pub rides_completed: usize,
    pub wallet: Decimal,
}
