//! Convenient re-exports for common regcore usage.
//!
//! # Example
//!
//! ```
//! use regcore::prelude::*;
//!
//! fn first_word(text: &str) -> Result<Option<Span>> {
//!     let re = Regex::new("[[:alpha:]]+")?;
//!     re.find(text)
//! }
//!
//! assert_eq!(first_word("  hello world").unwrap(), Some(Span::new(2, 7)));
//! ```

// Patterns
pub use crate::regex::{Regex, RegexBuilder};

// Results
pub use crate::span::{MatchResult, Span};

// Error handling
pub use crate::error::{RegexError, Result};

// Flags and options
pub use crate::flags::{CompileFlags, MatchFlags, MatchOptions};

// Configuration
pub use crate::config::EngineConfig;

// Handles
pub use crate::handle::{Handle, HandleGuard, HandleManager};

// Macros
pub use regcore_macros::regex;
