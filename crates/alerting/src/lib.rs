//! Alerting System
//!
//! Turns per-frame (distance, TTC) into a warning level and a debounced
//! audio/haptic command:
//! - Level classification (Clear / Caution / Danger)
//! - Cooldown between repeated alerts at the same level
//! - Display and alert collaborator interfaces

mod display;
mod level;
mod manager;
mod policy;
mod sink;

pub use display::DisplayUpdate;
pub use level::{classify_level, WarningLevel};
pub use manager::WarningController;
pub use policy::{AlertConfig, Decision, WarningPolicy, WarningState};
pub use sink::{AlertCommand, AlertSink, DisplaySink};

use thiserror::Error;

/// Alert configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum AlertError {
    #[error("Threshold {name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("Danger TTC {danger}s exceeds caution TTC {caution}s")]
    InvertedTtc { danger: f64, caution: f64 },
}
