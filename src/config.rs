//! Battle tuning knobs, loaded from a RON file.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BattleConfig {
    /// Escape attempts always succeed.
    pub always_escape: bool,
    /// A fleeing enemy is removed from targeting once its fade finishes.
    pub fleeing_enemy_excluded: bool,
    pub start_ticks: u32,
    pub first_attack_ticks: u32,
    pub escape_ticks: u32,
    /// Ticks between result lines.
    pub result_line_interval: u32,
    pub damage_anime_ticks: u32,
    pub dead_anime_ticks: u32,
    pub skill_anime_ticks: u32,
    /// Fixed RNG seed for replayable battles.
    pub seed: Option<u64>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            always_escape: false,
            fleeing_enemy_excluded: false,
            start_ticks: 60,
            first_attack_ticks: 60,
            escape_ticks: 60,
            result_line_interval: 20,
            damage_anime_ticks: 20,
            dead_anime_ticks: 30,
            skill_anime_ticks: 30,
            seed: None,
        }
    }
}

impl BattleConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = BattleConfig::from_ron_str("(always_escape: true, seed: Some(7))").unwrap();

        assert_eq!(
            config,
            BattleConfig {
                always_escape: true,
                seed: Some(7),
                ..BattleConfig::default()
            }
        );
        assert_eq!(config.start_ticks, 60);
        assert_eq!(config.result_line_interval, 20);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        assert!(matches!(
            BattleConfig::from_ron_str("(always_escape: maybe)"),
            Err(ConfigError::Ron(_))
        ));
    }
}
