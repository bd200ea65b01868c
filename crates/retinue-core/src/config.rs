//! Configuration loading and typed config structures for the Retinue engine.
//!
//! A configuration document has three sections, each optional:
//!
//! ```yaml
//! world:
//!   seed: 42
//!   starting_year: 847
//! lifecycle:
//!   betrayal_cap_pct: 25
//!   heir:
//!     max_loyalty_penalty: 9
//! logging:
//!   filter: "info"
//! ```
//!
//! Missing fields take their defaults, so an empty document is valid.

use std::path::Path;

use retinue_agents::LifecycleConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable that overrides `world.seed`.
pub const SEED_ENV_VAR: &str = "RETINUE_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Seed and calendar settings.
    #[serde(default)]
    pub world: WorldConfig,

    /// Lifecycle tunables handed to the agent manager.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Logging preferences for the embedding application.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `RETINUE_SEED` overrides `world.seed` when set to a valid integer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// `RETINUE_SEED` overrides `world.seed` when set to a valid integer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml reads an empty document as null rather than an empty map
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(SEED_ENV_VAR) {
            self.world.apply_seed_override(&val);
        }
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// In-game year the chronicle starts at.
    #[serde(default = "default_starting_year")]
    pub starting_year: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            starting_year: default_starting_year(),
        }
    }
}

impl WorldConfig {
    /// Replace the seed with `raw` if it parses as an unsigned integer.
    pub fn apply_seed_override(&mut self, raw: &str) {
        match raw.trim().parse::<u64>() {
            Ok(seed) => self.seed = seed,
            Err(err) => warn!(value = raw, error = %err, "Ignoring invalid RETINUE_SEED override"),
        }
    }
}

/// Logging configuration.
///
/// The library never installs a subscriber; the embedding application reads
/// this to configure its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive (e.g. `info` or `retinue_agents=debug`).
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

const fn default_seed() -> u64 {
    42
}

const fn default_starting_year() -> u32 {
    847
}

fn default_log_filter() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.starting_year, 847);
        assert_eq!(config.lifecycle.betrayal_cap_pct, 25);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  seed: 123
  starting_year: 900

lifecycle:
  betrayal_cap_pct: 10
  loyalty_decay:
    full_pct: 50
  recruit:
    age_min: 20
    age_max: 22
  heir:
    max_loyalty_penalty: 4
  bloodline:
    promotion_chance_pct: 75
    emergence_cap: 0.2

logging:
  filter: "retinue_agents=debug"
"#;

        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.starting_year, 900);
        assert_eq!(config.lifecycle.betrayal_cap_pct, 10);
        assert_eq!(config.lifecycle.loyalty_decay.full_pct, 50);
        assert_eq!(config.lifecycle.loyalty_decay.aware_pct, 20);
        assert_eq!(config.lifecycle.recruit.age_max, 22);
        assert_eq!(config.lifecycle.recruit.lifespan_min, 60);
        assert_eq!(config.lifecycle.heir.max_loyalty_penalty, 4);
        assert_eq!(config.lifecycle.bloodline.promotion_chance_pct, 75);
        assert!((config.lifecycle.bloodline.emergence_cap - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.logging.filter, "retinue_agents=debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("world:\n  starting_year: 1000\n").unwrap();

        // Year is overridden
        assert_eq!(config.world.starting_year, 1000);
        // Everything else uses defaults
        assert_eq!(config.lifecycle, LifecycleConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SimulationConfig::parse("").unwrap();
        assert_eq!(config.world.starting_year, 847);
        assert_eq!(config.lifecycle, LifecycleConfig::default());
    }

    #[test]
    fn parse_invalid_yaml() {
        let result = SimulationConfig::parse("world: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn seed_override_accepts_integers_only() {
        let mut world = WorldConfig::default();
        world.apply_seed_override(" 7 ");
        assert_eq!(world.seed, 7);
        world.apply_seed_override("seven");
        assert_eq!(world.seed, 7);
        world.apply_seed_override("-1");
        assert_eq!(world.seed, 7);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = SimulationConfig::from_file(Path::new("/nonexistent/retinue.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
