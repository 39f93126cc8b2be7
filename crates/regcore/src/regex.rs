//! Compiled regular expressions.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::compile::compile;
use crate::config::EngineConfig;
use crate::error::{RegexError, Result};
use crate::exec::{MatchState, exec_at};
use crate::flags::{CompileFlags, MatchOptions};
use crate::program::Program;
use crate::span::{MatchResult, Span};

/// A compiled POSIX regular expression.
///
/// `Regex` owns its program; clones share it. Matching never mutates the
/// regex, so a single instance can be used from many threads.
///
/// # Example
///
/// ```
/// use regcore::Regex;
///
/// let re = Regex::new("(a)(b(c))").unwrap();
/// assert_eq!(re.subexpression_count(), 3);
///
/// let m = re.captures("xabc").unwrap().unwrap();
/// assert_eq!(m.span().range(), 1..4);
/// assert_eq!(m.group(b"xabc", 2), Some(&b"bc"[..]));
/// ```
#[derive(Debug, Clone)]
pub struct Regex {
    pattern: Vec<u8>,
    program: Arc<Program>,
    /// The pattern recompiled with `ICASE`, built on first case-insensitive
    /// search.
    folded: OnceLock<Arc<Program>>,
    config: EngineConfig,
}

impl Regex {
    /// Compile an extended (ERE) pattern with default limits.
    ///
    /// # Errors
    ///
    /// Returns a syntax error for malformed patterns, or a resource limit
    /// error if the pattern is too large.
    pub fn new(pattern: &str) -> Result<Self> {
        RegexBuilder::new(pattern).build()
    }

    /// Compile a pattern with explicit flags, as `regcomp` does.
    ///
    /// # Errors
    ///
    /// As [`Regex::new`].
    pub fn with_flags(pattern: &[u8], flags: CompileFlags) -> Result<Self> {
        RegexBuilder::new(pattern).flags(flags).build()
    }

    /// Start building a regex.
    #[must_use]
    pub fn builder(pattern: impl AsRef<[u8]>) -> RegexBuilder {
        RegexBuilder::new(pattern)
    }

    /// The source pattern.
    #[must_use]
    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    /// The compiled program.
    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Flags the pattern was compiled with.
    #[must_use]
    pub fn flags(&self) -> CompileFlags {
        self.program.flags()
    }

    /// Limits in effect for this regex.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of parenthesized subexpressions.
    #[must_use]
    pub fn subexpression_count(&self) -> usize {
        self.program.subexpression_count()
    }

    /// A fresh matching state for this regex, carrying its step limit.
    #[must_use]
    pub fn state(&self) -> MatchState {
        MatchState::new(&self.program).with_step_limit(self.config.max_match_steps)
    }

    /// Search `text` with explicit options.
    ///
    /// # Errors
    ///
    /// Returns a resource limit error if the search exceeds
    /// `max_match_steps`.
    pub fn exec(
        &self,
        text: impl AsRef<[u8]>,
        options: &MatchOptions,
    ) -> Result<Option<MatchResult>> {
        let mut state = self.state();
        self.exec_with(&mut state, text.as_ref(), options)
    }

    /// Search `text` reusing a caller-owned state.
    ///
    /// With [`MatchOptions::case_insensitive`] the search runs the pattern
    /// as compiled with [`CompileFlags::ICASE`], so the option and the flag
    /// accept the same texts.
    ///
    /// # Errors
    ///
    /// As [`Regex::exec`].
    pub fn exec_with(
        &self,
        state: &mut MatchState,
        text: &[u8],
        options: &MatchOptions,
    ) -> Result<Option<MatchResult>> {
        let program = self.program_for(options)?;
        exec_at(program, state, text, 0, options)
    }

    fn program_for(&self, options: &MatchOptions) -> Result<&Program> {
        if !options.case_insensitive || self.flags().contains(CompileFlags::ICASE) {
            return Ok(&self.program);
        }
        if let Some(folded) = self.folded.get() {
            return Ok(folded);
        }
        let flags = self.flags() | CompileFlags::ICASE;
        let options = flags.parse_options(self.config.max_nesting_depth);
        let ast = regcore_syntax::parse_with(&self.pattern, options)
            .map_err(|err| RegexError::from_parse(err, &self.pattern))?;
        let program = compile(&ast, flags, &self.config)?;
        tracing::debug!(insts = program.len(), "compiled case-folded program");
        Ok(self.folded.get_or_init(|| Arc::new(program)))
    }

    /// The leftmost-longest match and its subexpressions.
    ///
    /// # Errors
    ///
    /// As [`Regex::exec`].
    pub fn captures(&self, text: impl AsRef<[u8]>) -> Result<Option<MatchResult>> {
        self.exec(text, &MatchOptions::new())
    }

    /// The span of the leftmost-longest match.
    ///
    /// # Errors
    ///
    /// As [`Regex::exec`].
    pub fn find(&self, text: impl AsRef<[u8]>) -> Result<Option<Span>> {
        Ok(self.captures(text)?.map(|m| m.span()))
    }

    /// Check whether the pattern matches anywhere in `text`.
    ///
    /// # Errors
    ///
    /// As [`Regex::exec`].
    pub fn is_match(&self, text: impl AsRef<[u8]>) -> Result<bool> {
        Ok(self.find(text)?.is_some())
    }

    /// Check whether the pattern matches all of `text`.
    ///
    /// # Errors
    ///
    /// As [`Regex::exec`].
    pub fn is_full_match(&self, text: impl AsRef<[u8]>) -> Result<bool> {
        Ok(self.exec(text, &MatchOptions::new().full())?.is_some())
    }

    /// Iterate over successive non-overlapping matches.
    ///
    /// After an empty match the search resumes one byte further on. Later
    /// searches see the text before them, so `^` only matches at line
    /// starts.
    pub fn find_iter<'r, 't>(&'r self, text: &'t [u8]) -> FindIter<'r, 't> {
        FindIter {
            regex: self,
            text,
            pos: 0,
            state: self.state(),
            done: false,
        }
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.pattern))
    }
}

impl std::str::FromStr for Regex {
    type Err = RegexError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Iterator returned by [`Regex::find_iter`].
///
/// Yields each match, or the error that stopped the search.
#[derive(Debug)]
pub struct FindIter<'r, 't> {
    regex: &'r Regex,
    text: &'t [u8],
    pos: usize,
    state: MatchState,
    done: bool,
}

impl Iterator for FindIter<'_, '_> {
    type Item = Result<MatchResult>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos > self.text.len() {
            return None;
        }
        let found = exec_at(
            &self.regex.program,
            &mut self.state,
            self.text,
            self.pos,
            &MatchOptions::new(),
        );
        match found {
            Ok(Some(m)) => {
                let span = m.span();
                self.pos = if span.is_empty() { span.end + 1 } else { span.end };
                Some(Ok(m))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Builder for [`Regex`].
///
/// Defaults to extended syntax with no other flags.
#[derive(Debug, Clone)]
pub struct RegexBuilder {
    pattern: Vec<u8>,
    flags: CompileFlags,
    config: EngineConfig,
}

impl RegexBuilder {
    /// Create a builder for `pattern`.
    #[must_use]
    pub fn new(pattern: impl AsRef<[u8]>) -> Self {
        Self {
            pattern: pattern.as_ref().to_vec(),
            flags: CompileFlags::EXTENDED,
            config: EngineConfig::default(),
        }
    }

    /// Replace every flag at once.
    #[must_use]
    pub const fn flags(mut self, flags: CompileFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Use extended syntax (`true`) or basic syntax (`false`).
    #[must_use]
    pub fn extended(mut self, enabled: bool) -> Self {
        self.flags.set(CompileFlags::EXTENDED, enabled);
        self
    }

    /// Ignore ASCII case.
    #[must_use]
    pub fn case_insensitive(mut self, enabled: bool) -> Self {
        self.flags.set(CompileFlags::ICASE, enabled);
        self
    }

    /// Report only the whole match.
    #[must_use]
    pub fn no_sub(mut self, enabled: bool) -> Self {
        self.flags.set(CompileFlags::NOSUB, enabled);
        self
    }

    /// Newline-sensitive matching.
    #[must_use]
    pub fn newline(mut self, enabled: bool) -> Self {
        self.flags.set(CompileFlags::NEWLINE, enabled);
        self
    }

    /// Use these limits.
    #[must_use]
    pub const fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Parse and compile the pattern.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unusable limits, a syntax error for
    /// malformed patterns, or a resource limit error if the pattern nests
    /// too deeply or compiles too large.
    pub fn build(&self) -> Result<Regex> {
        self.config.validate()?;

        let options = self.flags.parse_options(self.config.max_nesting_depth);
        let ast = regcore_syntax::parse_with(&self.pattern, options)
            .map_err(|err| RegexError::from_parse(err, &self.pattern))?;
        let program = compile(&ast, self.flags, &self.config)?;

        tracing::debug!(
            pattern = %String::from_utf8_lossy(&self.pattern),
            flags = ?self.flags,
            insts = program.len(),
            groups = program.subexpression_count(),
            "compiled pattern"
        );

        Ok(Regex {
            pattern: self.pattern.clone(),
            program: Arc::new(program),
            folded: OnceLock::new(),
            config: self.config,
        })
    }
}
