//! Environment-based configuration.

use std::collections::HashMap;

use super::EngineConfig;
use crate::error::{RegexError, Result};

/// Environment configuration prefix.
pub const DEFAULT_PREFIX: &str = "REGCORE";

/// Variable names understood by [`EnvConfig::apply`], without the prefix.
pub mod vars {
    /// Maximum compiled program size.
    pub const MAX_PROGRAM_SIZE: &str = "MAX_PROGRAM_SIZE";
    /// Maximum nesting depth.
    pub const MAX_NESTING_DEPTH: &str = "MAX_NESTING_DEPTH";
    /// Maximum search work; `0`, `none` or `unlimited` remove the bound.
    pub const MAX_MATCH_STEPS: &str = "MAX_MATCH_STEPS";
    /// Maximum capture slots per thread list.
    pub const MAX_MATCH_STATE: &str = "MAX_MATCH_STATE";
}

/// Environment variable reader.
///
/// Values set with [`EnvConfig::set`] shadow the process environment
/// without touching it, which keeps tests free of global mutation.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Prefix for environment variables.
    prefix: String,
    /// Local overrides, keyed by full variable name.
    overrides: HashMap<String, String>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl EnvConfig {
    /// Create a new environment config reader.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            overrides: HashMap::new(),
        }
    }

    /// Build the full environment variable name.
    fn var_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }

    /// Get a string value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let var_name = self.var_name(name);
        self.overrides
            .get(&var_name)
            .cloned()
            .or_else(|| std::env::var(&var_name).ok())
    }

    /// Get a parsed value, failing if it is set but malformed.
    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>> {
        self.get(name)
            .map(|raw| {
                raw.trim().parse().map_err(|_| {
                    RegexError::config(format!(
                        "{} has invalid value '{raw}'",
                        self.var_name(name)
                    ))
                })
            })
            .transpose()
    }

    /// Shadow a variable locally.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let var_name = self.var_name(name);
        self.overrides.insert(var_name, value.into());
    }

    /// Drop a local override.
    pub fn unset(&mut self, name: &str) {
        let var_name = self.var_name(name);
        self.overrides.remove(&var_name);
    }

    /// Apply every variable that is set on top of `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable does not parse or the result fails
    /// validation.
    pub fn apply(&self, mut config: EngineConfig) -> Result<EngineConfig> {
        if let Some(size) = self.parse(vars::MAX_PROGRAM_SIZE)? {
            config.max_program_size = size;
        }
        if let Some(depth) = self.parse(vars::MAX_NESTING_DEPTH)? {
            config.max_nesting_depth = depth;
        }
        if let Some(raw) = self.get(vars::MAX_MATCH_STEPS) {
            config.max_match_steps = match raw.trim().to_lowercase().as_str() {
                "0" | "none" | "unlimited" => None,
                _ => self.parse(vars::MAX_MATCH_STEPS)?,
            };
        }
        if let Some(slots) = self.parse(vars::MAX_MATCH_STATE)? {
            config.max_match_state = slots;
        }
        config.validate()?;
        tracing::debug!(?config, prefix = %self.prefix, "applied environment overrides");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_config_prefix() {
        let config = EnvConfig::new("TEST");
        assert_eq!(config.var_name("foo"), "TEST_FOO");
        assert_eq!(config.var_name("bar_baz"), "TEST_BAR_BAZ");
    }

    #[test]
    fn env_config_no_prefix() {
        let config = EnvConfig::new("");
        assert_eq!(config.var_name("foo"), "FOO");
    }

    #[test]
    fn overrides_apply() {
        let mut env = EnvConfig::new("REGCORE_TEST_APPLY");
        env.set(vars::MAX_PROGRAM_SIZE, "2048");
        env.set(vars::MAX_MATCH_STEPS, "10000");

        let config = env.apply(EngineConfig::default()).unwrap();
        assert_eq!(config.max_program_size, 2048);
        assert_eq!(config.max_match_steps, Some(10_000));
        assert_eq!(config.max_nesting_depth, super::super::DEFAULT_MAX_NESTING_DEPTH);

        env.set(vars::MAX_MATCH_STEPS, "unlimited");
        let config = env.apply(config).unwrap();
        assert_eq!(config.max_match_steps, None);

        env.unset(vars::MAX_PROGRAM_SIZE);
        assert!(env.get(vars::MAX_PROGRAM_SIZE).is_none());
    }

    #[test]
    fn malformed_value_is_config_error() {
        let mut env = EnvConfig::new("REGCORE_TEST_BAD");
        env.set(vars::MAX_NESTING_DEPTH, "deep");
        let err = env.apply(EngineConfig::default()).unwrap_err();
        assert!(err.to_string().contains("REGCORE_TEST_BAD_MAX_NESTING_DEPTH"));
    }

    #[test]
    fn nesting_depth_above_cap_is_rejected() {
        let mut env = EnvConfig::new("REGCORE_TEST_DEEP");
        env.set(vars::MAX_NESTING_DEPTH, "100000");
        let err = env.apply(EngineConfig::default()).unwrap_err();
        assert!(err.to_string().contains("max_nesting_depth"));
    }
}
