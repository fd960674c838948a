//! Gameplay settings
//!
//! Runtime-tunable balance values. Loaded from JSON by the host; any field
//! left out takes its default.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Game balance settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Lives at the start of a run (and after `restart`)
    pub starting_lives: u32,
    /// Probability that a destroyed brick drops a power-up
    pub powerup_drop_chance: f64,
    /// Seconds without any power-up drop before the carrier flies
    pub carrier_interval_secs: f32,
    /// Pause between the last brick falling and the level-complete transition
    pub level_complete_delay_secs: f32,
    /// RNG seed for drops, level coins and particles
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            powerup_drop_chance: 0.18,
            carrier_interval_secs: 90.0,
            level_complete_delay_secs: 0.6,
            seed: 0x5EED_B41C,
        }
    }
}

impl Settings {
    /// Parse settings from JSON (missing fields use defaults)
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let settings: Self = serde_json::from_str(json).map_err(Error::Settings)?;
        log::info!("Loaded settings (seed {:#x})", settings.seed);
        Ok(settings.sanitized())
    }

    /// Serialize settings to JSON
    pub fn to_json(&self) -> String {
        // Plain data with no maps keyed by non-strings; serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Clamp values into ranges the simulation accepts
    pub fn sanitized(mut self) -> Self {
        self.powerup_drop_chance = self.powerup_drop_chance.clamp(0.0, 1.0);
        self.starting_lives = self.starting_lives.max(1);
        self.carrier_interval_secs = self.carrier_interval_secs.max(1.0);
        self.level_complete_delay_secs = self.level_complete_delay_secs.max(0.0);
        self
    }

    /// Settings with power-up drops disabled (deterministic layouts in tests)
    pub fn without_drops() -> Self {
        Self {
            powerup_drop_chance: 0.0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "starting_lives": 5 }"#).unwrap();
        assert_eq!(settings.starting_lives, 5);
        assert_eq!(settings.powerup_drop_chance, 0.18);
        assert_eq!(settings.carrier_interval_secs, 90.0);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let settings =
            Settings::from_json(r#"{ "powerup_drop_chance": 3.5, "starting_lives": 0 }"#).unwrap();
        assert_eq!(settings.powerup_drop_chance, 1.0);
        assert_eq!(settings.starting_lives, 1);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = Settings::from_json("{ starting_lives: }").unwrap_err();
        assert!(matches!(err, Error::Settings(_)));
    }

    #[test]
    fn test_json_roundtrip_preserves_values() {
        let original = Settings {
            seed: 42,
            ..Settings::without_drops()
        };
        let parsed = Settings::from_json(&original.to_json()).unwrap();
        assert_eq!(parsed, original);
    }
}
