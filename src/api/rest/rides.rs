use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::settlement::Settlement;
use crate::engine::{dispatch, lifecycle, registry};
use crate::error::AppError;
use crate::models::ride::{Ride, RideRequest};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rides", post(request_ride).get(list_rides))
        .route("/rides/:id", get(get_ride))
        .route("/rides/:id/start", post(start_ride))
        .route("/rides/:id/end", post(end_ride))
        .route("/rides/:id/cancel", post(cancel_ride))
}

#[derive(Deserialize)]
pub struct EndRideRequest {
    pub rating: i64,
}

#[derive(Serialize)]
pub struct EndRideResponse {
    pub ride: Ride,
    pub fare: Decimal,
    pub rider_wallet: Decimal,
    pub driver_wallet: Decimal,
}

impl From<(Ride, Settlement)> for EndRideResponse {
    fn from((ride, settlement): (Ride, Settlement)) -> Self {
        Self {
            ride,
            fare: settlement.fare,
            rider_wallet: settlement.rider_wallet,
            driver_wallet: settlement.driver_wallet,
        }
    }
}

async fn request_ride(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RideRequest>,
) -> Result<Json<Ride>, AppError> {
    Ok(Json(dispatch::request_ride(&state, payload)?))
}

async fn list_rides(State(state): State<Arc<AppState>>) -> Json<Vec<Ride>> {
    let mut rides: Vec<Ride> = state
        .rides
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    rides.sort_by_key(|ride| ride.requested_at);
    Json(rides)
}

async fn get_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ride>, AppError> {
    Ok(Json(registry::get_ride(&state, id)?))
}

async fn start_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ride>, AppError> {
    Ok(Json(lifecycle::start_ride(&state, id)?))
}

async fn end_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EndRideRequest>,
) -> Result<Json<EndRideResponse>, AppError> {
    let completed = lifecycle::end_ride(&state, id, payload.rating)?;
    Ok(Json(completed.into()))
}

async fn cancel_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ride>, AppError> {
    Ok(Json(lifecycle::cancel_ride(&state, id)?))
}
