//! Single-slot frame hand-off
//!
//! The capture side publishes frames as fast as it produces them; the
//! detection worker only ever sees the most recent one. Frames published
//! while the worker is busy are replaced in the slot and never queued.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::{FrameError, VideoFrame};

type Slot = Option<Arc<VideoFrame>>;

/// Create a connected sender/receiver pair
pub fn frame_slot() -> (FrameSender, FrameReceiver) {
    let (tx, rx) = watch::channel(None);
    let published = Arc::new(AtomicU64::new(0));
    (
        FrameSender {
            tx,
            published: Arc::clone(&published),
        },
        FrameReceiver {
            rx,
            published,
            consumed: 0,
        },
    )
}

/// Producer half, owned by the capture collaborator
#[derive(Debug)]
pub struct FrameSender {
    tx: watch::Sender<Slot>,
    published: Arc<AtomicU64>,
}

impl FrameSender {
    /// Replace the slot contents with `frame`
    pub fn publish(&self, frame: VideoFrame) -> Result<(), FrameError> {
        if self.tx.is_closed() {
            return Err(FrameError::Closed);
        }
        self.published.fetch_add(1, Ordering::Relaxed);
        self.tx.send_replace(Some(Arc::new(frame)));
        Ok(())
    }

    /// Total frames published
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

/// Consumer half, owned by the detection worker
#[derive(Debug)]
pub struct FrameReceiver {
    rx: watch::Receiver<Slot>,
    published: Arc<AtomicU64>,
    consumed: u64,
}

impl FrameReceiver {
    /// Wait for the next unseen frame. Returns `None` once the sender is gone
    /// and the last frame has been taken.
    pub async fn next(&mut self) -> Option<Arc<VideoFrame>> {
        loop {
            if self.rx.changed().await.is_err() {
                debug!("Frame slot closed after {} frames", self.consumed);
                return None;
            }
            if let Some(frame) = self.rx.borrow_and_update().clone() {
                self.consumed += 1;
                return Some(frame);
            }
        }
    }

    /// Frames taken by this receiver
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Frames replaced in the slot before the worker could take them
    pub fn superseded(&self) -> u64 {
        self.published
            .load(Ordering::Relaxed)
            .saturating_sub(self.consumed)
    }
}
