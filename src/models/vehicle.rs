use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    Car,
    Bike,
    Cng,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VehicleStatus {
    Available,
    Unavailable,
}

/// A driver's vehicle. The rate is fixed when the vehicle is registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub kind: VehicleKind,
    pub license_plate: String,
    pub rate: Decimal,
    pub status: VehicleStatus,
}

impl Vehicle {
    pub fn new(kind: VehicleKind, license_plate: String, rate: Decimal) -> Self {
        Self {
            kind,
            license_plate,
            rate,
            status: VehicleStatus::Available,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == VehicleStatus::Available
    }
}
