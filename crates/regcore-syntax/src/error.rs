//! Error types for the regcore-syntax crate.
//!
//! This module provides [`ParseError`], raised for every malformed pattern,
//! and [`ErrorCode`], the POSIX classification of the failure.

use std::fmt;

/// POSIX `regcomp`/`regexec` error classification.
///
/// The numeric values match the GNU C library so foreign callers can map
/// them straight onto `REG_*` constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// `REG_NOMATCH`: the text did not match.
    NoMatch,
    /// `REG_BADPAT`: generic invalid pattern.
    BadPattern,
    /// `REG_ECOLLATE`: invalid collating element.
    InvalidCollation,
    /// `REG_ECTYPE`: unknown character class name.
    InvalidClass,
    /// `REG_EESCAPE`: trailing or unknown escape.
    TrailingEscape,
    /// `REG_ESUBREG`: back-reference to a subexpression.
    InvalidBackReference,
    /// `REG_EBRACK`: unmatched `[`.
    UnmatchedBracket,
    /// `REG_EPAREN`: unmatched parenthesis.
    UnmatchedParen,
    /// `REG_EBRACE`: unmatched `{`.
    UnmatchedBrace,
    /// `REG_BADBR`: invalid contents of an interval.
    InvalidBraceContents,
    /// `REG_ERANGE`: invalid range end point.
    InvalidRange,
    /// `REG_ESPACE`: a size or depth limit was exceeded.
    OutOfSpace,
    /// `REG_BADRPT`: repetition operator without an operand.
    BadRepetition,
}

impl ErrorCode {
    /// The numeric code used by the GNU C library.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::NoMatch => 1,
            Self::BadPattern => 2,
            Self::InvalidCollation => 3,
            Self::InvalidClass => 4,
            Self::TrailingEscape => 5,
            Self::InvalidBackReference => 6,
            Self::UnmatchedBracket => 7,
            Self::UnmatchedParen => 8,
            Self::UnmatchedBrace => 9,
            Self::InvalidBraceContents => 10,
            Self::InvalidRange => 11,
            Self::OutOfSpace => 12,
            Self::BadRepetition => 13,
        }
    }

    /// The `REG_*` constant name.
    #[must_use]
    pub const fn posix_name(self) -> &'static str {
        match self {
            Self::NoMatch => "REG_NOMATCH",
            Self::BadPattern => "REG_BADPAT",
            Self::InvalidCollation => "REG_ECOLLATE",
            Self::InvalidClass => "REG_ECTYPE",
            Self::TrailingEscape => "REG_EESCAPE",
            Self::InvalidBackReference => "REG_ESUBREG",
            Self::UnmatchedBracket => "REG_EBRACK",
            Self::UnmatchedParen => "REG_EPAREN",
            Self::UnmatchedBrace => "REG_EBRACE",
            Self::InvalidBraceContents => "REG_BADBR",
            Self::InvalidRange => "REG_ERANGE",
            Self::OutOfSpace => "REG_ESPACE",
            Self::BadRepetition => "REG_BADRPT",
        }
    }

    /// A short human-readable description, in the spirit of `regerror`.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::NoMatch => "no match",
            Self::BadPattern => "invalid regular expression",
            Self::InvalidCollation => "invalid collation character",
            Self::InvalidClass => "invalid character class name",
            Self::TrailingEscape => "trailing or invalid backslash",
            Self::InvalidBackReference => "invalid back reference",
            Self::UnmatchedBracket => "unmatched [ or [^",
            Self::UnmatchedParen => "unmatched ( or )",
            Self::UnmatchedBrace => "unmatched \\{",
            Self::InvalidBraceContents => "invalid content of \\{\\}",
            Self::InvalidRange => "invalid range end",
            Self::OutOfSpace => "memory exhausted",
            Self::BadRepetition => "invalid preceding regular expression",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.posix_name())
    }
}

/// The error type for pattern parsing.
///
/// Every variant carries the byte offset into the pattern where the
/// problem was detected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The pattern is malformed.
    #[error("{code} at offset {offset}: {message}")]
    Syntax {
        /// POSIX classification of the failure.
        code: ErrorCode,
        /// Byte offset into the pattern.
        offset: usize,
        /// What went wrong.
        message: String,
    },

    /// Groups are nested deeper than the configured limit.
    #[error("nesting limit of {limit} exceeded at offset {offset}")]
    NestLimitExceeded {
        /// The configured limit.
        limit: u32,
        /// Byte offset of the group that crossed the limit.
        offset: usize,
    },
}

/// A specialized Result type for parsing.
pub type Result<T> = std::result::Result<T, ParseError>;

impl ParseError {
    /// Create a syntax error.
    pub fn syntax(code: ErrorCode, offset: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            code,
            offset,
            message: message.into(),
        }
    }

    /// Create a syntax error using the code's default description.
    #[must_use]
    pub fn code_at(code: ErrorCode, offset: usize) -> Self {
        Self::syntax(code, offset, code.description())
    }

    /// The POSIX classification of this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Syntax { code, .. } => *code,
            Self::NestLimitExceeded { .. } => ErrorCode::OutOfSpace,
        }
    }

    /// Byte offset into the pattern.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::Syntax { offset, .. } | Self::NestLimitExceeded { offset, .. } => *offset,
        }
    }

    /// Check if this error is a resource limit rather than malformed input.
    #[must_use]
    pub const fn is_limit(&self) -> bool {
        matches!(self, Self::NestLimitExceeded { .. })
    }
}
