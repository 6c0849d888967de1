//! Warning Controller
//!
//! Owns the hysteresis state for one session and drives the display and
//! alert collaborators.

use std::time::Instant;

use adas::DetectionResult;
use tracing::{debug, info};

use crate::display::DisplayUpdate;
use crate::level::WarningLevel;
use crate::policy::{AlertConfig, Decision, WarningPolicy, WarningState};
use crate::sink::{AlertCommand, AlertSink, DisplaySink};

/// Warning controller for one camera session
pub struct WarningController {
    policy: WarningPolicy,
    state: WarningState,
    level: WarningLevel,
    alert: Box<dyn AlertSink>,
    display: Box<dyn DisplaySink>,
}

impl WarningController {
    pub fn new(
        config: AlertConfig,
        alert: Box<dyn AlertSink>,
        display: Box<dyn DisplaySink>,
    ) -> Self {
        info!("Creating warning controller with config: {:?}", config);
        Self {
            policy: WarningPolicy::new(config),
            state: WarningState::default(),
            level: WarningLevel::Clear,
            alert,
            display,
        }
    }

    /// Frame with a detection
    pub fn on_detection(&mut self, result: &DetectionResult, ttc_s: Option<f64>, now: Instant) -> Decision {
        let (state, decision) = self
            .policy
            .on_detection(self.state, result.distance_m, ttc_s, now);
        self.state = state;
        self.level = decision.level;

        self.display
            .update(DisplayUpdate::from_detection(decision.level, result, ttc_s));
        self.dispatch(decision.command);
        decision
    }

    /// Frame without a detection
    pub fn on_no_detection(&mut self) -> Decision {
        let (state, decision) = self.policy.on_no_detection(self.state);
        self.state = state;
        self.level = decision.level;

        self.display.update(DisplayUpdate::clear());
        self.dispatch(decision.command);
        decision
    }

    /// Release the audio/haptic cue at session end
    pub fn release(&mut self) {
        info!("Releasing alert output");
        self.alert.send(AlertCommand::Clear);
    }

    /// Level shown for the last frame
    pub fn level(&self) -> WarningLevel {
        self.level
    }

    pub fn state(&self) -> WarningState {
        self.state
    }

    /// Forget hysteresis history
    pub fn reset(&mut self) {
        self.state = WarningState::default();
        self.level = WarningLevel::Clear;
    }

    fn dispatch(&mut self, command: Option<AlertCommand>) {
        if let Some(command) = command {
            debug!("Alert command: {}", command.as_str());
            self.alert.send(command);
        }
    }
}
