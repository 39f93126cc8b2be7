//! Error types for regcore.
//!
//! This module defines all error types used throughout the engine.
//! Syntax errors carry the POSIX error code, the byte offset and the pattern
//! itself so the rendered message can point at the offending byte.

use std::fmt;

use regcore_syntax::{ErrorCode, ParseError};
use thiserror::Error;

use crate::handle::Handle;

/// Maximum pattern length shown in error messages.
const MAX_PATTERN_DISPLAY: usize = 80;

/// Format a pattern with a caret under `offset`, truncating long patterns
/// around the offset.
fn format_pattern_snippet(pattern: &str, offset: usize) -> String {
    if pattern.is_empty() {
        return "(empty pattern)".to_string();
    }

    let offset = offset.min(pattern.len());
    let (shown, caret) = if pattern.len() <= MAX_PATTERN_DISPLAY {
        (pattern.to_string(), offset)
    } else {
        let half = MAX_PATTERN_DISPLAY / 2;
        let start = offset.saturating_sub(half);
        let end = (start + MAX_PATTERN_DISPLAY).min(pattern.len());
        let window: String = pattern
            .char_indices()
            .filter(|(i, _)| (start..end).contains(i))
            .map(|(_, c)| c)
            .collect();
        let prefix = if start > 0 { "..." } else { "" };
        let suffix = if end < pattern.len() { "..." } else { "" };
        (
            format!("{prefix}{window}{suffix}"),
            prefix.len() + offset - start,
        )
    };

    format!("  {shown}\n  {}^", " ".repeat(caret))
}

/// Format a syntax error message with a pointer into the pattern.
fn format_syntax_error(code: ErrorCode, offset: usize, message: &str, pattern: &str) -> String {
    format!(
        "invalid pattern ({code}) at offset {offset}: {message}\n\
         \n\
         {}",
        format_pattern_snippet(pattern, offset)
    )
}

/// Which configured ceiling was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitKind {
    /// The compiled program grew past `max_program_size` instructions.
    ProgramSize,
    /// Groups or repetitions nested past `max_nesting_depth`.
    NestingDepth,
    /// A single search did more than `max_match_steps` units of work.
    MatchSteps,
    /// Searching the program would need more than `max_match_state`
    /// capture slots per thread list.
    MatchState,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ProgramSize => "program size",
            Self::NestingDepth => "nesting depth",
            Self::MatchSteps => "match steps",
            Self::MatchState => "match state",
        })
    }
}

/// The main error type for regcore operations.
#[derive(Debug, Error)]
pub enum RegexError {
    /// The pattern is malformed.
    #[error("{}", format_syntax_error(*code, *offset, message, pattern))]
    Syntax {
        /// POSIX classification of the failure.
        code: ErrorCode,
        /// Byte offset into the pattern.
        offset: usize,
        /// Description of what is wrong.
        message: String,
        /// The pattern, lossily decoded for display.
        pattern: String,
    },

    /// A configured size, depth or work ceiling was exceeded.
    #[error("resource limit exceeded: {kind} above {limit}")]
    ResourceLimit {
        /// Which ceiling was hit.
        kind: LimitKind,
        /// The configured value of that ceiling.
        limit: u64,
    },

    /// The handle was released, or never issued.
    #[error("invalid handle {handle}: released or never issued")]
    InvalidHandle {
        /// The offending handle.
        handle: Handle,
    },

    /// An I/O error occurred while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An I/O error occurred with additional context.
    #[error("{context}: {source}")]
    IoWithContext {
        /// What operation was being performed.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Result type alias for regcore operations.
pub type Result<T> = std::result::Result<T, RegexError>;

impl RegexError {
    /// Create a syntax error.
    pub fn syntax(
        code: ErrorCode,
        offset: usize,
        message: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        Self::Syntax {
            code,
            offset,
            message: message.into(),
            pattern: pattern.into(),
        }
    }

    /// Convert a parser error, attaching the pattern it came from.
    #[must_use]
    pub fn from_parse(err: ParseError, pattern: &[u8]) -> Self {
        match err {
            ParseError::Syntax {
                code,
                offset,
                message,
            } => Self::syntax(code, offset, message, String::from_utf8_lossy(pattern)),
            ParseError::NestLimitExceeded { limit, .. } => {
                Self::resource_limit(LimitKind::NestingDepth, u64::from(limit))
            }
        }
    }

    /// Create a resource limit error.
    #[must_use]
    pub const fn resource_limit(kind: LimitKind, limit: u64) -> Self {
        Self::ResourceLimit { kind, limit }
    }

    /// Create an invalid handle error.
    #[must_use]
    pub const fn invalid_handle(handle: Handle) -> Self {
        Self::InvalidHandle { handle }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_context(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoWithContext {
            context: context.into(),
            source,
        }
    }

    /// Wrap an I/O result with context.
    pub fn with_io_context<T>(result: std::io::Result<T>, context: impl Into<String>) -> Result<T> {
        result.map_err(|e| Self::io_context(context, e))
    }

    /// Check if this is a syntax error.
    #[must_use]
    pub const fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }

    /// Check if this is a resource limit error.
    #[must_use]
    pub const fn is_resource_limit(&self) -> bool {
        matches!(self, Self::ResourceLimit { .. })
    }

    /// Check if this error reports handle misuse.
    #[must_use]
    pub const fn is_invalid_handle(&self) -> bool {
        matches!(self, Self::InvalidHandle { .. })
    }

    /// The POSIX error code, for syntax and resource errors.
    #[must_use]
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Syntax { code, .. } => Some(*code),
            Self::ResourceLimit { .. } => Some(ErrorCode::OutOfSpace),
            _ => None,
        }
    }

    /// The byte offset into the pattern, for syntax errors.
    #[must_use]
    pub const fn offset(&self) -> Option<usize> {
        match self {
            Self::Syntax { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// The limit kind, for resource limit errors.
    #[must_use]
    pub const fn limit_kind(&self) -> Option<LimitKind> {
        match self {
            Self::ResourceLimit { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
