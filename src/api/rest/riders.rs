use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::registry::{self, NewRider};
use crate::error::AppError;
use crate::geo::GeoPoint;
use crate::models::rider::Rider;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/riders", post(create_rider).get(list_riders))
        .route("/riders/:id", get(get_rider))
        .route("/riders/:id/wallet", post(top_up_wallet))
        .route("/riders/:id/location", patch(update_rider_location))
}

#[derive(Deserialize)]
pub struct TopUpRequest {
    pub amount: Decimal,
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub location: GeoPoint,
}

async fn create_rider(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewRider>,
) -> Result<Json<Rider>, AppError> {
    Ok(Json(registry::register_rider(&state, payload)?))
}

async fn list_riders(State(state): State<Arc<AppState>>) -> Json<Vec<Rider>> {
    let riders = state
        .riders
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(riders)
}

async fn get_rider(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Rider>, AppError> {
    Ok(Json(registry::get_rider(&state, id)?))
}

async fn top_up_wallet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TopUpRequest>,
) -> Result<Json<Rider>, AppError> {
    Ok(Json(registry::load_cash(&state, id, payload.amount)?))
}

async fn update_rider_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<Rider>, AppError> {
    Ok(Json(registry::update_rider_location(
        &state,
        id,
        payload.location,
    )?))
}
