//! Frame Routes

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use camera_capture::{FrameError, PixelFormat, VideoFrame};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ApiError, AppState};

/// Query parameters describing the raw frame body
#[derive(Debug, Deserialize)]
pub struct FrameQuery {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "rgb24".to_string()
}

/// Response for an accepted frame
#[derive(Debug, Serialize)]
pub struct FrameAccepted {
    pub sequence: u64,
    /// Frames published so far
    pub published: u64,
}

/// Hand a frame to the detection worker. Frames are never queued: a frame
/// still waiting when the next arrives is replaced.
pub async fn post_frame(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FrameQuery>,
    body: Bytes,
) -> Result<(StatusCode, Json<FrameAccepted>), ApiError> {
    let format: PixelFormat = params.format.parse()?;
    let sequence = state.sequence.fetch_add(1, Ordering::Relaxed) + 1;
    let timestamp_ns = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    let frame = VideoFrame::new(
        body.to_vec(),
        params.width,
        params.height,
        format,
        timestamp_ns,
        sequence,
    );
    state.frames.publish(frame).map_err(|e| match e {
        FrameError::Closed => ApiError::Unavailable("frame worker stopped".to_string()),
        other => ApiError::BadFrame(other),
    })?;
    debug!("Frame {} accepted ({}x{} {:?})", sequence, params.width, params.height, format);

    Ok((
        StatusCode::ACCEPTED,
        Json(FrameAccepted {
            sequence,
            published: state.frames.published(),
        }),
    ))
}
