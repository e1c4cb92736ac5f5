//! Engine settings
//!
//! Tunables for the frame loop and the settle heuristics. Defaults reproduce
//! the reference behavior; hosts can override them from a TOML table:
//!
//! ```toml
//! max_frame_delta = 32.0
//! default_decay = 0.995
//! decay_rest_distance = 0.05
//! ```

use rebound_core::{ConfigError, Result};
use serde::Deserialize;

/// Largest frame delta (ms) the scheduler will integrate in one tick
pub const MAX_FRAME_DELTA: f64 = 64.0;
/// Decay rate for configs that ask for decay without one
pub const DEFAULT_DECAY: f64 = 0.998;
/// Decay finishes once a frame moves the value less than this
pub const DECAY_REST_DISTANCE: f64 = 0.1;
/// Precision used when a channel starts on its own target
pub const ZERO_DISPLACEMENT_PRECISION: f64 = 0.005;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    /// Upper bound on a single tick's delta (ms)
    pub max_frame_delta: f64,
    /// Per-ms velocity retention for decay configs without a rate
    pub default_decay: f64,
    pub decay_rest_distance: f64,
    pub zero_displacement_precision: f64,
}

impl EngineSettings {
    /// Parse settings from a TOML document; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(source).map_err(|e| ConfigError::Settings(e.to_string()))?;
        settings.validated()
    }

    /// Builder: override the frame delta clamp
    pub fn with_max_frame_delta(mut self, max_frame_delta: f64) -> Self {
        self.max_frame_delta = max_frame_delta;
        self
    }

    pub fn validated(self) -> Result<Self> {
        let fields = [
            ("max_frame_delta", self.max_frame_delta),
            ("decay_rest_distance", self.decay_rest_distance),
            ("zero_displacement_precision", self.zero_displacement_precision),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Settings(format!(
                    "`{}` must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if !(self.default_decay > 0.0 && self.default_decay < 1.0) {
            return Err(ConfigError::InvalidDecay(self.default_decay));
        }
        Ok(self)
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_frame_delta: MAX_FRAME_DELTA,
            default_decay: DEFAULT_DECAY,
            decay_rest_distance: DECAY_REST_DISTANCE,
            zero_displacement_precision: ZERO_DISPLACEMENT_PRECISION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let settings = EngineSettings::from_toml_str("").unwrap();
        assert_eq!(settings, EngineSettings::default());
        assert_eq!(settings.max_frame_delta, 64.0);
    }

    #[test]
    fn test_partial_override() {
        let settings = EngineSettings::from_toml_str("max_frame_delta = 32.0").unwrap();
        assert_eq!(settings.max_frame_delta, 32.0);
        assert_eq!(settings.decay_rest_distance, DECAY_REST_DISTANCE);
    }

    #[test]
    fn test_default_decay_bounds() {
        let settings = EngineSettings::from_toml_str("default_decay = 0.99").unwrap();
        assert_eq!(settings.default_decay, 0.99);
        assert!(matches!(
            EngineSettings::from_toml_str("default_decay = 1.0"),
            Err(ConfigError::InvalidDecay(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_and_invalid_keys() {
        assert!(matches!(
            EngineSettings::from_toml_str("frame_cap = 10.0"),
            Err(ConfigError::Settings(_))
        ));
        assert!(matches!(
            EngineSettings::from_toml_str("max_frame_delta = -1.0"),
            Err(ConfigError::Settings(_))
        ));
    }
}
