use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::ride::RideStatus;

/// Failures of the dispatch and ride lifecycle operations.
///
/// Every variant leaves riders, drivers and rides in the state they had
/// before the failing call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RideError {
    #[error("no driver with an available vehicle")]
    NoAvailableDriver,

    #[error("cannot {action} ride {ride} while it is {from:?}")]
    InvalidTransition {
        ride: Uuid,
        from: RideStatus,
        action: &'static str,
    },

    #[error("insufficient funds for rider {rider}: available {available}, required {required}")]
    InsufficientFunds {
        rider: Uuid,
        available: Decimal,
        required: Decimal,
    },

    #[error("rating {0} is outside 1..=5")]
    InvalidRating(i64),

    #[error("rider {rider} already has active ride {ride}")]
    RiderHasActiveRide { rider: Uuid, ride: Uuid },

    #[error("rider {0} not found")]
    RiderNotFound(Uuid),

    #[error("driver {0} not found")]
    DriverNotFound(Uuid),

    #[error("ride {0} not found")]
    RideNotFound(Uuid),

    #[error("amount {0} must be positive")]
    InvalidAmount(Decimal),

    #[error("location ({x}, {y}) is not a finite coordinate")]
    InvalidLocation { x: f64, y: f64 },

    #[error("trip of {distance} units cannot be priced")]
    UnpricableTrip { distance: f64 },

    #[error("arithmetic overflow in {operation} for {party}")]
    ArithmeticOverflow {
        operation: &'static str,
        party: Uuid,
    },

    #[error("inconsistent state: {0}")]
    InconsistentState(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Ride(#[from] RideError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl RideError {
    fn status_code(&self) -> StatusCode {
        match self {
            RideError::RiderNotFound(_) | RideError::DriverNotFound(_) | RideError::RideNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            RideError::NoAvailableDriver => StatusCode::SERVICE_UNAVAILABLE,
            RideError::InvalidTransition { .. } | RideError::RiderHasActiveRide { .. } => {
                StatusCode::CONFLICT
            }
            RideError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
            RideError::InvalidRating(_)
            | RideError::InvalidAmount(_)
            | RideError::InvalidLocation { .. }
            | RideError::UnpricableTrip { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RideError::ArithmeticOverflow { .. } | RideError::InconsistentState(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Ride(err) => (err.status_code(), err.to_string()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
