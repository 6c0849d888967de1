//! Alert hysteresis policy
//!
//! Pure `(state, input) -> (state, decision)` functions. The level shown to
//! the driver is recomputed every frame; only the audio/haptic command is
//! debounced by the cooldown.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::level::{classify_level, WarningLevel};
use crate::sink::AlertCommand;
use crate::AlertError;

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Minimum time between repeated commands at the same level (ms)
    pub cooldown_ms: u64,
    /// Danger requires TTC below this (seconds)...
    pub danger_ttc_s: f64,
    /// ...and distance below this (meters)
    pub danger_distance_m: f64,
    /// Caution requires TTC below this (seconds)
    pub caution_ttc_s: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 1500,
            danger_ttc_s: 2.0,
            danger_distance_m: 10.0,
            caution_ttc_s: 3.5,
        }
    }
}

impl AlertConfig {
    /// Create strict config (earlier warnings)
    pub fn strict() -> Self {
        Self {
            danger_ttc_s: 2.5,
            danger_distance_m: 15.0,
            caution_ttc_s: 4.5,
            ..Default::default()
        }
    }

    /// Create lenient config (later warnings, longer cooldown)
    pub fn lenient() -> Self {
        Self {
            cooldown_ms: 3000,
            danger_ttc_s: 1.5,
            danger_distance_m: 7.0,
            caution_ttc_s: 2.5,
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn validate(&self) -> Result<(), AlertError> {
        for (name, value) in [
            ("danger_ttc_s", self.danger_ttc_s),
            ("danger_distance_m", self.danger_distance_m),
            ("caution_ttc_s", self.caution_ttc_s),
        ] {
            if !(value > 0.0) {
                return Err(AlertError::NonPositive { name, value });
            }
        }
        if self.danger_ttc_s > self.caution_ttc_s {
            return Err(AlertError::InvertedTtc {
                danger: self.danger_ttc_s,
                caution: self.caution_ttc_s,
            });
        }
        Ok(())
    }
}

/// Hysteresis state carried across frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarningState {
    /// Level of the last issued command (or forced Clear)
    pub last_level: WarningLevel,
    /// When the last command was issued
    pub last_alert_at: Option<Instant>,
}

/// Result of one policy step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Level to display
    pub level: WarningLevel,
    /// Command for the alert collaborator, if any
    pub command: Option<AlertCommand>,
}

/// Warning level and alert cooldown rules
#[derive(Debug, Clone, Default)]
pub struct WarningPolicy {
    config: AlertConfig,
}

impl WarningPolicy {
    pub fn new(config: AlertConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Frame with a detection
    pub fn on_detection(
        &self,
        state: WarningState,
        distance_m: f64,
        ttc_s: Option<f64>,
        now: Instant,
    ) -> (WarningState, Decision) {
        let level = classify_level(distance_m, ttc_s, &self.config);
        let cooldown_elapsed = state
            .last_alert_at
            .map_or(true, |at| now.saturating_duration_since(at) >= self.config.cooldown());

        if level == state.last_level && !cooldown_elapsed {
            debug!("Alert suppressed: {} in cooldown", level.as_str());
            return (state, Decision { level, command: None });
        }

        let next = WarningState {
            last_level: level,
            last_alert_at: Some(now),
        };
        (
            next,
            Decision {
                level,
                command: Some(AlertCommand::for_level(level)),
            },
        )
    }

    /// Frame without a detection: force Clear, cancel any active cue
    pub fn on_no_detection(&self, state: WarningState) -> (WarningState, Decision) {
        let command = (state.last_level != WarningLevel::Clear).then_some(AlertCommand::Clear);
        let next = WarningState {
            last_level: WarningLevel::Clear,
            ..state
        };
        (
            next,
            Decision {
                level: WarningLevel::Clear,
                command,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_first_detection_fires() {
        let policy = WarningPolicy::default();
        let (state, decision) = policy.on_detection(WarningState::default(), 8.0, Some(1.5), Instant::now());

        assert_eq!(decision.level, WarningLevel::Danger);
        assert_eq!(decision.command, Some(AlertCommand::PlayAlarm));
        assert_eq!(state.last_level, WarningLevel::Danger);
    }

    #[test]
    fn test_cooldown_suppresses_repeat() {
        let policy = WarningPolicy::default();
        let t0 = Instant::now();

        let (state, first) = policy.on_detection(WarningState::default(), 8.0, Some(1.5), t0);
        let (state, second) = policy.on_detection(state, 8.0, Some(1.5), t0 + ms(200));
        let (_, third) = policy.on_detection(state, 8.0, Some(1.5), t0 + ms(1600));

        assert_eq!(first.command, Some(AlertCommand::PlayAlarm));
        assert_eq!(second.command, None);
        assert_eq!(second.level, WarningLevel::Danger);
        assert_eq!(third.command, Some(AlertCommand::PlayAlarm));
    }

    #[test]
    fn test_level_change_bypasses_cooldown() {
        let policy = WarningPolicy::default();
        let t0 = Instant::now();

        let (state, _) = policy.on_detection(WarningState::default(), 15.0, Some(3.0), t0);
        let (_, decision) = policy.on_detection(state, 8.0, Some(1.5), t0 + ms(100));
        assert_eq!(decision.command, Some(AlertCommand::PlayAlarm));
    }

    #[test]
    fn test_suppressed_frame_keeps_timestamp() {
        let policy = WarningPolicy::default();
        let t0 = Instant::now();

        let (state, _) = policy.on_detection(WarningState::default(), 8.0, Some(1.5), t0);
        let (state, _) = policy.on_detection(state, 8.0, Some(1.5), t0 + ms(1000));
        assert_eq!(state.last_alert_at, Some(t0));

        let (_, decision) = policy.on_detection(state, 8.0, Some(1.5), t0 + ms(1500));
        assert_eq!(decision.command, Some(AlertCommand::PlayAlarm));
    }

    #[test]
    fn test_no_detection_clears_immediately() {
        let policy = WarningPolicy::default();
        let t0 = Instant::now();

        let (state, _) = policy.on_detection(WarningState::default(), 8.0, Some(1.5), t0);
        let (state, decision) = policy.on_no_detection(state);
        assert_eq!(decision.level, WarningLevel::Clear);
        assert_eq!(decision.command, Some(AlertCommand::Clear));
        assert_eq!(state.last_alert_at, Some(t0));

        // Already clear: nothing to cancel
        let (_, decision) = policy.on_no_detection(state);
        assert_eq!(decision.command, None);
    }

    #[test]
    fn test_danger_after_no_detection_fires_within_cooldown() {
        let policy = WarningPolicy::default();
        let t0 = Instant::now();

        let (state, _) = policy.on_detection(WarningState::default(), 8.0, Some(1.5), t0);
        let (state, _) = policy.on_no_detection(state);
        let (_, decision) = policy.on_detection(state, 8.0, Some(1.5), t0 + ms(300));
        assert_eq!(decision.command, Some(AlertCommand::PlayAlarm));
    }

    #[test]
    fn test_clear_detection_reissues_clear_after_cooldown() {
        let policy = WarningPolicy::default();
        let t0 = Instant::now();

        let (state, first) = policy.on_detection(WarningState::default(), 50.0, None, t0);
        assert_eq!(first.command, Some(AlertCommand::Clear));
        let (state, second) = policy.on_detection(state, 50.0, None, t0 + ms(500));
        assert_eq!(second.command, None);
        let (_, third) = policy.on_detection(state, 50.0, None, t0 + ms(2000));
        assert_eq!(third.command, Some(AlertCommand::Clear));
    }

    #[test]
    fn test_config_validation() {
        assert!(AlertConfig::default().validate().is_ok());
        assert!(AlertConfig::strict().validate().is_ok());
        assert!(AlertConfig::lenient().validate().is_ok());

        let inverted = AlertConfig {
            danger_ttc_s: 5.0,
            ..Default::default()
        };
        assert_eq!(
            inverted.validate(),
            Err(AlertError::InvertedTtc {
                danger: 5.0,
                caution: 3.5
            })
        );

        let negative = AlertConfig {
            danger_distance_m: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(AlertError::NonPositive { name: "danger_distance_m", .. })
        ));
    }
}
