use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use uuid::Uuid;

use crate::api::rest::riders::UpdateLocationRequest;
use crate::engine::registry::{self, NewDriver};
use crate::error::AppError;
use crate::models::driver::{Driver, DriverProfile};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drivers", post(create_driver).get(list_drivers))
        .route("/drivers/:id/profile", get(driver_profile))
        .route("/drivers/:id/location", patch(update_driver_location))
}

async fn create_driver(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewDriver>,
) -> Result<Json<Driver>, AppError> {
    Ok(Json(registry::register_driver(&state, payload)?))
}

async fn list_drivers(State(state): State<Arc<AppState>>) -> Json<Vec<Driver>> {
    let mut drivers: Vec<Driver> = state
        .drivers
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    drivers.sort_by_key(|driver| driver.seq);
    Json(drivers)
}

async fn driver_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DriverProfile>, AppError> {
    Ok(Json(registry::driver_profile(&state, id)?))
}

async fn update_driver_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<Driver>, AppError> {
    Ok(Json(registry::update_driver_location(
        &state,
        id,
        payload.location,
    )?))
}
