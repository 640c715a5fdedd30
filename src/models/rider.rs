use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rider {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub location: GeoPoint,
    pub wallet: Decimal,
    pub active_ride: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}
