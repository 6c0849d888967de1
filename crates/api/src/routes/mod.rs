//! HTTP adapters for the frame, speed and display collaborators

pub mod frames;
pub mod speed;
pub mod warning;
