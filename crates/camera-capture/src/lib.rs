//! Camera Frame Library for the Collision Pipeline
//!
//! Frames are produced by an external camera collaborator and handed to
//! the detection worker. This crate provides:
//! - Frame container with pixel format tagging and validation
//! - Decoding of the supported pixel formats to RGB
//! - Average luminance for the heuristic detector
//! - A single-slot "latest frame wins" channel for backpressure

pub mod frame;
pub mod latest;

pub use frame::{PixelFormat, VideoFrame};
pub use latest::{frame_slot, FrameReceiver, FrameSender};

use thiserror::Error;

/// Frame error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame buffer is empty")]
    Empty,

    #[error("Invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Frame buffer length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Unsupported pixel format: {0:?}")]
    Unsupported(PixelFormat),

    #[error("Unknown pixel format: {0}")]
    UnknownFormat(String),

    #[error("Frame decode failed: {0}")]
    Decode(String),

    #[error("Frame channel closed")]
    Closed,
}
