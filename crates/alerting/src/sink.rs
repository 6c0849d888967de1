//! Display and alert collaborator interfaces

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::warn;

use crate::display::DisplayUpdate;
use crate::level::WarningLevel;

/// Command for the audio/haptic collaborator. Safe to repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCommand {
    /// Stop any active cue
    Clear,
    /// Caution cue
    PlayWarning,
    /// Danger cue
    PlayAlarm,
}

impl AlertCommand {
    pub fn for_level(level: WarningLevel) -> Self {
        match level {
            WarningLevel::Clear => AlertCommand::Clear,
            WarningLevel::Caution => AlertCommand::PlayWarning,
            WarningLevel::Danger => AlertCommand::PlayAlarm,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertCommand::Clear => "clear",
            AlertCommand::PlayWarning => "play_warning",
            AlertCommand::PlayAlarm => "play_alarm",
        }
    }
}

/// Receives alert commands
pub trait AlertSink: Send {
    fn send(&mut self, command: AlertCommand);
}

/// Receives display updates
pub trait DisplaySink: Send {
    fn update(&mut self, update: DisplayUpdate);
}

impl AlertSink for mpsc::Sender<AlertCommand> {
    fn send(&mut self, command: AlertCommand) {
        // Never block the frame worker on a slow collaborator
        if let Err(e) = self.try_send(command) {
            warn!("Alert command {} dropped: {}", command.as_str(), e);
        }
    }
}

impl DisplaySink for watch::Sender<DisplayUpdate> {
    fn update(&mut self, update: DisplayUpdate) {
        // Latest update wins, with or without subscribers
        self.send_replace(update);
    }
}

/// Discards everything
impl AlertSink for () {
    fn send(&mut self, _command: AlertCommand) {}
}

impl DisplaySink for () {
    fn update(&mut self, _update: DisplayUpdate) {}
}
