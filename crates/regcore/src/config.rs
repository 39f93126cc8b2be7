//! Configuration types for regcore.
//!
//! This module defines [`EngineConfig`], the resource ceilings applied while
//! compiling and matching, together with its builder. Values can also be
//! read from the environment ([`EnvConfig`]) or from TOML/JSON files
//! ([`ConfigLoader`]).

mod env;
mod file;

pub use env::{DEFAULT_PREFIX, EnvConfig, vars};
pub use file::{ConfigFormat, ConfigLoader, parse_config};

use serde::{Deserialize, Serialize};

use crate::error::{RegexError, Result};

/// Default ceiling on compiled program size, in instructions.
pub const DEFAULT_MAX_PROGRAM_SIZE: usize = 100_000;

/// Default ceiling on group and repetition nesting.
pub const DEFAULT_MAX_NESTING_DEPTH: u32 = regcore_syntax::DEFAULT_NEST_LIMIT;

/// Largest accepted `max_nesting_depth`. Parsing, compiling and dropping a
/// syntax tree recurse once per level, so deeper trees risk the stack.
pub const MAX_NESTING_DEPTH_CAP: u32 = 1_000;

/// Default ceiling on per-search capture slots.
pub const DEFAULT_MAX_MATCH_STATE: usize = 4_000_000;

/// Resource ceilings for compiling and matching.
///
/// # Example
///
/// ```
/// use regcore::EngineConfig;
///
/// let config = EngineConfig::builder()
///     .max_program_size(10_000)
///     .max_match_steps(1_000_000)
///     .build();
/// assert_eq!(config.max_program_size, 10_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum number of instructions in a compiled program.
    pub max_program_size: usize,

    /// Maximum nesting of groups and stacked repetition operators.
    pub max_nesting_depth: u32,

    /// Maximum work units for a single search, unlimited when `None`.
    pub max_match_steps: Option<u64>,

    /// Maximum capture slots a search may allocate per thread list: the
    /// program length times the slots each thread carries.
    pub max_match_state: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_program_size: DEFAULT_MAX_PROGRAM_SIZE,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_match_steps: None,
            max_match_state: DEFAULT_MAX_MATCH_STATE,
        }
    }
}

impl EngineConfig {
    /// Create a new builder for `EngineConfig`.
    #[must_use]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    /// Create a new `EngineConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default settings overridden by `REGCORE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but does not parse.
    pub fn from_env() -> Result<Self> {
        EnvConfig::default().apply(Self::default())
    }

    /// Check that every ceiling is usable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.max_program_size == 0 {
            return Err(RegexError::config("max_program_size must be positive"));
        }
        if self.max_nesting_depth == 0 {
            return Err(RegexError::config("max_nesting_depth must be positive"));
        }
        if self.max_nesting_depth > MAX_NESTING_DEPTH_CAP {
            return Err(RegexError::config(format!(
                "max_nesting_depth must not exceed {MAX_NESTING_DEPTH_CAP}"
            )));
        }
        if self.max_match_steps == Some(0) {
            return Err(RegexError::config("max_match_steps must be positive"));
        }
        if self.max_match_state == 0 {
            return Err(RegexError::config("max_match_state must be positive"));
        }
        Ok(())
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Create a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum program size in instructions.
    #[must_use]
    pub const fn max_program_size(mut self, size: usize) -> Self {
        self.config.max_program_size = size;
        self
    }

    /// Set the maximum nesting depth.
    #[must_use]
    pub const fn max_nesting_depth(mut self, depth: u32) -> Self {
        self.config.max_nesting_depth = depth;
        self
    }

    /// Bound the work a single search may do.
    #[must_use]
    pub const fn max_match_steps(mut self, steps: u64) -> Self {
        self.config.max_match_steps = Some(steps);
        self
    }

    /// Set the maximum capture slots per thread list.
    #[must_use]
    pub const fn max_match_state(mut self, slots: usize) -> Self {
        self.config.max_match_state = slots;
        self
    }

    /// Remove the bound on search work.
    #[must_use]
    pub const fn unlimited_match_steps(mut self) -> Self {
        self.config.max_match_steps = None;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub const fn build(self) -> EngineConfig {
        self.config
    }
}
