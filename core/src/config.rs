//! Engine configuration.
//!
//! Configuration is plain data: it can be built in code through
//! [`EngineBuilder`](crate::EngineBuilder) or read from a TOML file.
//!
//! ```toml
//! effect-errors = "fail-fast"
//! max-consecutive-passes = 16
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A configuration that cannot drive an engine.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The text is not valid TOML for [`EngineConfig`].
    #[error("invalid engine configuration")]
    Parse(#[from] toml::de::Error),
    /// A limit that must allow at least one step was set to zero.
    #[error("`{key}` must be at least 1")]
    ZeroLimit {
        /// The offending key.
        key: &'static str,
    },
}

/// What happens when an effect callback returns an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectErrorPolicy {
    /// Log the failure and keep flushing the remaining effects.
    #[default]
    Isolate,
    /// Skip the remaining effects of the pass and return the error.
    FailFast,
}

/// Tunables of an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Effect failure handling.
    pub effect_errors: EffectErrorPolicy,
    /// Upper bound on passes run back to back by one render or state update.
    pub max_consecutive_passes: usize,
    /// Upper bound on component-to-component resolution of a root descriptor.
    pub max_component_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            effect_errors: EffectErrorPolicy::Isolate,
            max_consecutive_passes: 64,
            max_component_depth: 32,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from TOML text. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this structure or
    /// fails [`Self::validate`].
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the limits leave room for at least one pass.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroLimit`] when `max-consecutive-passes` is 0.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.max_consecutive_passes == 0 {
            return Err(ConfigError::ZeroLimit {
                key: "max-consecutive-passes",
            });
        }
        Ok(())
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config = EngineConfig::from_toml_str("effect-errors = \"fail-fast\"").expect("parses");
        assert_eq!(config.effect_errors, EffectErrorPolicy::FailFast);
        assert_eq!(config.max_consecutive_passes, 64);
        assert_eq!(config.max_component_depth, 32);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(EngineConfig::from_toml_str("effect-errors = \"retry\"").is_err());
    }

    #[test]
    fn zero_pass_limit_is_rejected() {
        let error = EngineConfig::from_toml_str("max-consecutive-passes = 0")
            .expect_err("a zero limit could never render");
        assert!(matches!(
            error,
            ConfigError::ZeroLimit { key: "max-consecutive-passes" }
        ));
    }

    #[test]
    fn load_reports_the_path() {
        let error = EngineConfig::load(Path::new("/nonexistent/rivulet.toml"))
            .expect_err("missing file");
        assert!(error.to_string().contains("rivulet.toml"));
    }
}
