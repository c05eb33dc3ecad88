//! Analysis configuration
//!
//! Key-set and scan settings are plain data loaded from a TOML file; every
//! analysis run owns its own copy, so concurrent runs never share state.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("left and right hand sets overlap: {0:?}")]
    OverlappingHands(Vec<String>),
}

/// Main analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Log discovery settings
    #[serde(default)]
    pub logs: LogConfig,
    /// Key set designations
    #[serde(default)]
    pub keys: KeyConfig,
    /// Cross-hand roll scan settings
    #[serde(default)]
    pub rolls: RollConfig,
}

/// Log discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory scanned for `keyboard_log_*.json` files
    pub directory: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./log"),
        }
    }
}

/// Key set designations: modifier candidates and the two hand groups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyConfig {
    /// Keys analyzed as home row modifier candidates, matched exactly
    pub modifier_candidates: Vec<String>,
    /// Left-hand physical key group (lowercase identifiers)
    pub left_hand: Vec<String>,
    /// Right-hand physical key group (lowercase identifiers)
    pub right_hand: Vec<String>,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            modifier_candidates: to_strings(&["f", "j", "SPACE"]),
            left_hand: to_strings(&[
                "1", "2", "3", "4", "5", "q", "w", "e", "r", "t", "a", "s", "d", "f", "g",
                "z", "x", "c", "v", "b", "`", "[", "]",
            ]),
            right_hand: to_strings(&[
                "6", "7", "8", "9", "0", "p", "y", "u", "i", "o", "h", "j", "k", "l", ";",
                "n", "m", ",", ".", "/", "\\",
            ]),
        }
    }
}

/// Cross-hand roll scan settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollConfig {
    /// Maximum number of subsequent events scanned per press
    pub lookahead_events: usize,
    /// Key names excluded from the other-key search (lowercase)
    pub skip_keys: Vec<String>,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            lookahead_events: 30,
            skip_keys: to_strings(&["shift", "key.shift", "ctrl", "alt", "cmd"]),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// The two hand sets must be disjoint for roll direction to be defined.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let left = self.left_hand_set();
        let mut shared: Vec<String> = self
            .right_hand_set()
            .into_iter()
            .filter(|k| left.contains(k))
            .collect();
        if shared.is_empty() {
            Ok(())
        } else {
            shared.sort();
            Err(ConfigError::OverlappingHands(shared))
        }
    }

    /// Modifier candidates, matched exactly as logged
    pub fn candidate_set(&self) -> HashSet<String> {
        self.keys.modifier_candidates.iter().cloned().collect()
    }

    pub fn left_hand_set(&self) -> HashSet<String> {
        fold_set(&self.keys.left_hand)
    }

    pub fn right_hand_set(&self) -> HashSet<String> {
        fold_set(&self.keys.right_hand)
    }

    pub fn roll_skip_set(&self) -> HashSet<String> {
        fold_set(&self.rolls.skip_keys)
    }
}

fn fold_set(keys: &[String]) -> HashSet<String> {
    keys.iter().map(|k| k.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_config_path() -> PathBuf {
        env::temp_dir().join(format!("hrm-tuner-test-{}.toml", std::process::id()))
    }

    #[test]
    fn default_values() {
        let config = Config::default();
        assert_eq!(config.logs.directory, PathBuf::from("./log"));
        assert_eq!(config.rolls.lookahead_events, 30);
        assert!(config.candidate_set().contains("f"));
        assert!(config.candidate_set().contains("SPACE"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_hand_sets_are_disjoint() {
        let config = Config::default();
        let left = config.left_hand_set();
        let right = config.right_hand_set();
        assert!(left.is_disjoint(&right));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let path = temp_config_path();

        let mut config = Config::default();
        config.rolls.lookahead_events = 50;
        config.keys.modifier_candidates = vec!["d".to_string(), "k".to_string()];

        config.save_to(&path).expect("failed to save config");
        let loaded = Config::load_from(&path).expect("failed to load config");

        assert_eq!(loaded.rolls.lookahead_events, 50);
        assert!(loaded.candidate_set().contains("d"));
        assert!(loaded.candidate_set().contains("k"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn overlapping_hand_sets_rejected() {
        let mut config = Config::default();
        config.keys.right_hand.push("f".to_string());
        match config.validate() {
            Err(ConfigError::OverlappingHands(shared)) => {
                assert_eq!(shared, vec!["f".to_string()])
            }
            other => panic!("expected OverlappingHands, got {:?}", other),
        }
    }

    #[test]
    fn partial_toml_uses_section_defaults() {
        let toml_str = r#"
[rolls]
lookahead_events = 10
skip_keys = ["shift"]
"#;
        let config: Config = toml::from_str(toml_str).expect("failed to deserialize");
        assert_eq!(config.rolls.lookahead_events, 10);
        // omitted sections fall back to defaults
        assert!(config.candidate_set().contains("j"));
        assert_eq!(config.logs.directory, PathBuf::from("./log"));
    }

    #[test]
    fn hand_sets_fold_to_lowercase() {
        let mut config = Config::default();
        config.keys.left_hand = vec!["Q".to_string()];
        assert!(config.left_hand_set().contains("q"));
    }
}
