//! Warning Routes

use std::sync::Arc;

use alerting::DisplayUpdate;
use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

/// Display state with pre-formatted text
#[derive(Debug, Serialize)]
pub struct WarningResponse {
    pub level_code: u8,
    pub distance_text: String,
    pub ttc_text: String,
    pub confidence_text: String,
    pub degraded: bool,
    #[serde(flatten)]
    pub update: DisplayUpdate,
}

/// Current warning level and display fields
pub async fn get_warning(State(state): State<Arc<AppState>>) -> Json<WarningResponse> {
    let update = state.display.borrow().clone();

    Json(WarningResponse {
        level_code: update.level.as_u8(),
        distance_text: update.distance_text(),
        ttc_text: update.ttc_text(),
        confidence_text: update.confidence_text(),
        degraded: state.degraded.is_some(),
        update,
    })
}
