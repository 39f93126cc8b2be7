//! Compile and match flags.
//!
//! [`CompileFlags`] and [`MatchFlags`] mirror the `REG_*` bits accepted by
//! `regcomp` and `regexec`. [`MatchOptions`] is the richer per-call option
//! set used by the matcher itself.

use bitflags::bitflags;
use regcore_syntax::{Dialect, ParseOptions};

bitflags! {
    /// Flags accepted when compiling a pattern.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CompileFlags: u32 {
        /// Use extended (ERE) syntax instead of basic (BRE).
        const EXTENDED = 0b0001;
        /// Ignore ASCII case.
        const ICASE = 0b0010;
        /// Report only success or failure, not subexpression spans.
        const NOSUB = 0b0100;
        /// Newline-sensitive matching.
        const NEWLINE = 0b1000;
    }
}

bitflags! {
    /// Flags accepted when executing a compiled pattern.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MatchFlags: u32 {
        /// The start of the text is not the start of a line.
        const NOTBOL = 0b01;
        /// The end of the text is not the end of a line.
        const NOTEOL = 0b10;
    }
}

impl CompileFlags {
    /// The parser dialect selected by these flags.
    #[must_use]
    pub const fn dialect(self) -> Dialect {
        if self.contains(Self::EXTENDED) {
            Dialect::Extended
        } else {
            Dialect::Basic
        }
    }

    /// Parser options for these flags and the given nesting limit.
    #[must_use]
    pub fn parse_options(self, nest_limit: u32) -> ParseOptions {
        ParseOptions::new(self.dialect())
            .newline(self.contains(Self::NEWLINE))
            .case_insensitive(self.contains(Self::ICASE))
            .nest_limit(nest_limit)
    }
}

/// Per-call matching options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MatchOptions {
    /// Only accept matches that start at the beginning of the text.
    pub anchored_start: bool,
    /// Only accept matches that end at the end of the text.
    pub anchored_end: bool,
    /// Ignore ASCII case for this call. [`Regex`](crate::Regex) honours it
    /// by searching the pattern as compiled with [`CompileFlags::ICASE`];
    /// a bare [`exec`](crate::exec::exec) runs its program as compiled.
    pub case_insensitive: bool,
    /// `^` does not match at the start of the text.
    pub not_bol: bool,
    /// `$` does not match at the end of the text.
    pub not_eol: bool,
}

impl MatchOptions {
    /// Create default options: unanchored, case-sensitive.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            anchored_start: false,
            anchored_end: false,
            case_insensitive: false,
            not_bol: false,
            not_eol: false,
        }
    }

    /// Require the match to start at the beginning of the text.
    #[must_use]
    pub const fn anchored_start(mut self, enabled: bool) -> Self {
        self.anchored_start = enabled;
        self
    }

    /// Require the match to end at the end of the text.
    #[must_use]
    pub const fn anchored_end(mut self, enabled: bool) -> Self {
        self.anchored_end = enabled;
        self
    }

    /// Require the match to cover the whole text.
    #[must_use]
    pub const fn full(self) -> Self {
        self.anchored_start(true).anchored_end(true)
    }

    /// Ignore ASCII case.
    #[must_use]
    pub const fn case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    /// Treat the start of the text as mid-line.
    #[must_use]
    pub const fn not_bol(mut self, enabled: bool) -> Self {
        self.not_bol = enabled;
        self
    }

    /// Treat the end of the text as mid-line.
    #[must_use]
    pub const fn not_eol(mut self, enabled: bool) -> Self {
        self.not_eol = enabled;
        self
    }
}

impl From<MatchFlags> for MatchOptions {
    fn from(flags: MatchFlags) -> Self {
        Self::new()
            .not_bol(flags.contains(MatchFlags::NOTBOL))
            .not_eol(flags.contains(MatchFlags::NOTEOL))
    }
}
