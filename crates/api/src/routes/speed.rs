//! Speed Routes

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::{ApiError, AppState};

/// Raw speed sample from the location collaborator
#[derive(Debug, Deserialize)]
pub struct SpeedSample {
    /// Meters per second
    pub speed_ms: f64,
}

/// Current filtered speed
#[derive(Debug, Serialize)]
pub struct SpeedResponse {
    pub speed_kmh: f64,
}

/// Submit a raw speed sample
pub async fn post_speed(
    State(state): State<Arc<AppState>>,
    Json(sample): Json<SpeedSample>,
) -> Result<StatusCode, ApiError> {
    if state.speed.send(sample.speed_ms) {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(ApiError::Unavailable("speed sensor busy or stopped".to_string()))
    }
}

/// Latest filtered speed
pub async fn get_speed(State(state): State<Arc<AppState>>) -> Json<SpeedResponse> {
    Json(SpeedResponse {
        speed_kmh: state.speed.speed_kmh(),
    })
}
