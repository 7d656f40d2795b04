//! Resolver settings.

use serde::{Deserialize, Serialize};

/// Behavior switches for one [`Resolver`](crate::resolver::Resolver).
///
/// Deserializes from partial input; missing fields keep their defaults.
///
/// # Examples
/// ```
/// use sijill_container::settings::Settings;
///
/// let settings = Settings::default().with_cycle_detection(true);
/// assert!(settings.detect_cycles);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fail with a `CircularDependency` message when a constructor cycle is
    /// entered, instead of recursing until the stack overflows.
    pub detect_cycles: bool,
}

impl Settings {
    pub fn with_cycle_detection(mut self, enabled: bool) -> Self {
        self.detect_cycles = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_detection_is_off_by_default() {
        assert!(!Settings::default().detect_cycles);
    }

    #[test]
    fn deserializes_partial_input() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());

        let settings: Settings = serde_json::from_str(r#"{"detect_cycles": true}"#).unwrap();
        assert!(settings.detect_cycles);
    }

    #[test]
    fn serializes_field_names() {
        let json = serde_json::to_value(Settings::default().with_cycle_detection(true)).unwrap();
        assert_eq!(json, serde_json::json!({ "detect_cycles": true }));
    }
}
