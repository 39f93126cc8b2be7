//! regcore: POSIX regular expression engine
//!
//! This crate compiles POSIX basic and extended regular expressions into
//! Thompson NFA programs and runs them with leftmost-longest semantics,
//! reporting the span of every parenthesized subexpression.
//!
//! # Features
//!
//! - **Both POSIX dialects**: BRE by default, ERE with
//!   [`CompileFlags::EXTENDED`], as `regcomp` selects them
//! - **Leftmost-longest matching** with POSIX subexpression rules
//! - **Opaque handles** via [`HandleManager`] and the [`api`] module, with
//!   use-after-release detected rather than undefined
//! - **Resource ceilings** on program size, nesting depth and search work
//!   ([`EngineConfig`]), loadable from the environment or TOML/JSON files
//! - **Compile-time validated patterns** with [`regex!`]
//!
//! # Example
//!
//! ```
//! use regcore::{CompileFlags, Regex};
//!
//! let re = Regex::new("a|ab").unwrap();
//! assert_eq!(re.find("ab").unwrap().unwrap().range(), 0..2);
//!
//! let bre = Regex::with_flags(br"\(x*\)y", CompileFlags::empty()).unwrap();
//! let m = bre.captures("xxy").unwrap().unwrap();
//! assert_eq!(m.offsets(), vec![(0, 3), (0, 2)]);
//! ```

// Re-export macros
pub use regcore_macros::regex;

// Core types
pub mod config;
pub mod error;
pub mod flags;
pub mod prelude;
pub mod span;

// Engine
pub mod compile;
pub mod exec;
pub mod program;
pub mod regex;

// Handles
pub mod api;
pub mod handle;

pub use config::{
    ConfigFormat, ConfigLoader, DEFAULT_MAX_MATCH_STATE, DEFAULT_MAX_NESTING_DEPTH,
    DEFAULT_MAX_PROGRAM_SIZE, EngineConfig, EngineConfigBuilder, EnvConfig, MAX_NESTING_DEPTH_CAP,
};
pub use error::{LimitKind, RegexError, Result};
pub use exec::MatchState;
pub use flags::{CompileFlags, MatchFlags, MatchOptions};
pub use handle::{Handle, HandleGuard, HandleManager, HandleStats, global_manager};
pub use program::{Inst, Look, Program, Tag};
pub use regcore_syntax::{ErrorCode, RE_DUP_MAX};
pub use regex::{FindIter, Regex, RegexBuilder};
pub use span::{MatchResult, Span};

#[doc(hidden)]
pub mod __private {
    pub use std::sync::OnceLock;
}

// Test utilities
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::{
    ConformanceCase, MatchAssertions, assert_groups, assert_syntax_error, conformance_cases,
    run_case,
};
