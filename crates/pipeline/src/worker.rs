//! Frame worker
//!
//! Processes frames sequentially on a blocking thread so that model
//! inference never stalls the async runtime. The latest-only slot provides
//! backpressure: frames published while a frame is in flight replace each
//! other and only the newest is processed.

use std::time::Instant;

use camera_capture::FrameReceiver;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::session::{FrameOutcome, PipelineSession};
use crate::PipelineError;

/// Dedicated frame processing worker
pub struct FrameWorker {
    handle: JoinHandle<PipelineSession>,
}

impl FrameWorker {
    /// Start processing frames from `frames`, delivering each outcome on
    /// `results`. Runs until the frame sender is dropped.
    pub fn spawn(
        mut session: PipelineSession,
        mut frames: FrameReceiver,
        results: mpsc::Sender<FrameOutcome>,
    ) -> Self {
        let runtime = Handle::current();

        let handle = tokio::task::spawn_blocking(move || {
            info!("Frame worker started");

            while let Some(frame) = runtime.block_on(frames.next()) {
                let outcome = session.process_frame(&frame, Instant::now());
                metrics::counter!("frames_superseded_total").absolute(frames.superseded());

                match results.try_send(outcome) {
                    Ok(()) => {}
                    Err(TrySendError::Full(outcome)) => {
                        debug!("Result for frame {} dropped, subscriber lagging", outcome.sequence);
                    }
                    // Display and alert collaborators are still driven
                    Err(TrySendError::Closed(_)) => {}
                }
            }

            info!(
                "Frame worker finished ({} processed, {} superseded)",
                frames.consumed(),
                frames.superseded()
            );
            session
        });

        Self { handle }
    }

    /// Wait for the worker to drain and return the session
    pub async fn join(self) -> Result<PipelineSession, PipelineError> {
        self.handle
            .await
            .map_err(|e| PipelineError::Worker(e.to_string()))
    }
}
