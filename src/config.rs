// Configuration module for reading Snake.toml
// This module provides OOP-style configuration management for the engine and server

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::types::{Direction, PolicyMode, SearchStrategy};

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub engine: EngineConfig,
    pub policy: PolicyConfig,
    pub appearance: AppearanceConfig,
    pub profiling: ProfilingConfig,
    pub sessions: SessionConfig,
}

/// Engine construction settings
#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    pub mode: PolicyMode,
    pub strategy: SearchStrategy,
    /// Seed for the neighbor shuffle; omitted means seed from the OS
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Decision policy constants
#[derive(Debug, Deserialize, Clone)]
pub struct PolicyConfig {
    /// Cycle shortcuts are only considered while
    /// `len < size * numerator / denominator`
    pub shortcut_length_numerator: usize,
    pub shortcut_length_denominator: usize,
    /// Returned when graph search finds no free neighbor at all
    pub fallback_direction: Direction,
}

/// Metadata reported by GET /
#[derive(Debug, Deserialize, Clone)]
pub struct AppearanceConfig {
    pub author: String,
    pub color: String,
    pub head: String,
    pub tail: String,
}

/// Performance profiling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ProfilingConfig {
    pub enabled: bool,
    pub log_to_stderr: bool,
}

/// Limits on per-game engines kept by the HTTP service
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Oldest sessions are evicted to stay under this count
    pub max_active: usize,
    /// Sessions without a request for this long are dropped
    pub idle_timeout_secs: u64,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Snake.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, String> {
        let config: Config =
            toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))?;

        if config.policy.shortcut_length_denominator == 0 {
            return Err("policy.shortcut_length_denominator must be positive".to_string());
        }
        if config.sessions.max_active == 0 {
            return Err("sessions.max_active must be positive".to_string());
        }
        Ok(config)
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Snake.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        Config {
            engine: EngineConfig {
                mode: PolicyMode::GraphSearch,
                strategy: SearchStrategy::Sequential,
                seed: None,
            },
            policy: PolicyConfig {
                shortcut_length_numerator: 3,
                shortcut_length_denominator: 4,
                fallback_direction: Direction::Down,
            },
            appearance: AppearanceConfig {
                author: "snake-autopilot".to_string(),
                color: "#00DEAD".to_string(),
                head: "default".to_string(),
                tail: "default".to_string(),
            },
            profiling: ProfilingConfig {
                enabled: false,
                log_to_stderr: true,
            },
            sessions: SessionConfig {
                max_active: 64,
                idle_timeout_secs: 600,
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Snake.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }

    /// Same defaults with a fixed seed, for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        let mut config = Self::default_hardcoded();
        config.engine.seed = Some(seed);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_can_be_created() {
        let config = Config::default_hardcoded();
        assert_eq!(config.engine.mode, PolicyMode::GraphSearch);
        assert_eq!(config.policy.fallback_direction, Direction::Down);
        assert_eq!(config.engine.seed, None);
    }

    #[test]
    fn test_snake_toml_can_be_parsed() {
        // This test ensures Snake.toml is valid and can be parsed
        let result = Config::from_file("Snake.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Snake.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config = Config::from_file("Snake.toml").expect("Snake.toml should be parseable");
        let hardcoded_config = Config::default_hardcoded();

        assert_eq!(file_config.engine.mode, hardcoded_config.engine.mode);
        assert_eq!(file_config.engine.strategy, hardcoded_config.engine.strategy);
        assert_eq!(file_config.engine.seed, hardcoded_config.engine.seed);
        assert_eq!(
            file_config.policy.shortcut_length_numerator,
            hardcoded_config.policy.shortcut_length_numerator
        );
        assert_eq!(
            file_config.policy.shortcut_length_denominator,
            hardcoded_config.policy.shortcut_length_denominator
        );
        assert_eq!(
            file_config.policy.fallback_direction,
            hardcoded_config.policy.fallback_direction
        );
        assert_eq!(file_config.profiling.enabled, hardcoded_config.profiling.enabled);
        assert_eq!(
            file_config.profiling.log_to_stderr,
            hardcoded_config.profiling.log_to_stderr
        );
        assert_eq!(
            file_config.sessions.max_active,
            hardcoded_config.sessions.max_active
        );
        assert_eq!(
            file_config.sessions.idle_timeout_secs,
            hardcoded_config.sessions.idle_timeout_secs
        );
    }

    #[test]
    fn test_modes_parse_from_toml() {
        let toml = r##"
            [engine]
            mode = "cycle_following"
            strategy = "parallel"
            seed = 7

            [policy]
            shortcut_length_numerator = 1
            shortcut_length_denominator = 2
            fallback_direction = "left"

            [appearance]
            author = "a"
            color = "#000000"
            head = "default"
            tail = "default"

            [profiling]
            enabled = true
            log_to_stderr = false

            [sessions]
            max_active = 2
            idle_timeout_secs = 30
        "##;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.engine.mode, PolicyMode::CycleFollowing);
        assert_eq!(config.engine.strategy, SearchStrategy::Parallel);
        assert_eq!(config.engine.seed, Some(7));
        assert_eq!(config.policy.fallback_direction, Direction::Left);
        assert_eq!(config.appearance.color, "#000000");
        assert_eq!(config.sessions.max_active, 2);
    }

    #[test]
    fn test_zero_denominator_rejected() {
        let mut toml = std::fs::read_to_string("Snake.toml").unwrap();
        toml = toml.replace("shortcut_length_denominator = 4", "shortcut_length_denominator = 0");
        assert!(Config::from_toml(&toml).is_err());
    }

    #[test]
    fn test_zero_session_cap_rejected() {
        let mut toml = std::fs::read_to_string("Snake.toml").unwrap();
        toml = toml.replace("max_active = 64", "max_active = 0");
        assert!(Config::from_toml(&toml).is_err());
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        // Test with a non-existent file
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
    }
}
