//! Warning level classification

use serde::{Deserialize, Serialize};

use crate::policy::AlertConfig;

/// Collision danger level, ordered by urgency
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum WarningLevel {
    #[default]
    Clear = 0,
    Caution = 1,
    Danger = 2,
}

impl WarningLevel {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WarningLevel::Clear => "clear",
            WarningLevel::Caution => "caution",
            WarningLevel::Danger => "danger",
        }
    }
}

/// Level for one frame. First match wins: Danger, Caution, Clear.
pub fn classify_level(distance_m: f64, ttc_s: Option<f64>, config: &AlertConfig) -> WarningLevel {
    match ttc_s {
        Some(ttc) if ttc < config.danger_ttc_s && distance_m < config.danger_distance_m => {
            WarningLevel::Danger
        }
        Some(ttc) if ttc < config.caution_ttc_s => WarningLevel::Caution,
        _ => WarningLevel::Clear,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_level_examples() {
        let config = AlertConfig::default();
        assert_eq!(classify_level(8.0, Some(1.5), &config), WarningLevel::Danger);
        assert_eq!(classify_level(15.0, Some(3.0), &config), WarningLevel::Caution);
        assert_eq!(classify_level(15.0, Some(5.0), &config), WarningLevel::Clear);
        assert_eq!(classify_level(5.0, None, &config), WarningLevel::Clear);
    }

    #[test]
    fn test_far_but_imminent_is_caution() {
        let config = AlertConfig::default();
        assert_eq!(classify_level(12.0, Some(1.0), &config), WarningLevel::Caution);
    }

    #[test]
    fn test_boundaries_are_exclusive() {
        let config = AlertConfig::default();
        assert_eq!(classify_level(9.9, Some(2.0), &config), WarningLevel::Caution);
        assert_eq!(classify_level(10.0, Some(1.9), &config), WarningLevel::Caution);
        assert_eq!(classify_level(20.0, Some(3.5), &config), WarningLevel::Clear);
    }

    #[test]
    fn test_levels_ordered() {
        assert!(WarningLevel::Danger > WarningLevel::Caution);
        assert!(WarningLevel::Caution > WarningLevel::Clear);
        assert_eq!(WarningLevel::Danger.as_u8(), 2);
    }

    proptest! {
        #[test]
        fn prop_danger_requires_both_thresholds(
            distance in 0.0f64..200.0,
            ttc in proptest::option::of(0.0f64..20.0),
        ) {
            let config = AlertConfig::default();
            let level = classify_level(distance, ttc, &config);
            match level {
                WarningLevel::Danger => prop_assert!(distance < 10.0 && ttc.unwrap() < 2.0),
                WarningLevel::Caution => prop_assert!(ttc.unwrap() < 3.5),
                WarningLevel::Clear => prop_assert!(ttc.map_or(true, |t| t >= 3.5)),
            }
        }
    }
}
