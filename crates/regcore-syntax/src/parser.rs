//! Recursive-descent parser for POSIX basic and extended patterns.
//!
//! Precedence, loosest first: alternation, concatenation, repetition, atom.
//! Capture indices are handed out in order of opening parentheses, so the
//! numbering is left-to-right and 1-based.

use crate::ast::{AnchorKind, Ast};
use crate::class::{ByteSet, PosixClass, escape_class};
use crate::error::{ErrorCode, ParseError, Result};

/// Largest bound accepted inside `{m,n}`.
pub const RE_DUP_MAX: u32 = 0x7fff;

/// Default limit on group and repetition nesting.
pub const DEFAULT_NEST_LIMIT: u32 = 250;

/// Which POSIX syntax to accept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Basic regular expressions: `\( \)`, `\{ \}`, `*`.
    Basic,
    /// Extended regular expressions: `( ) | * + ? { }`.
    #[default]
    Extended,
}

/// Options controlling how a pattern is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParseOptions {
    /// Syntax dialect.
    pub dialect: Dialect,
    /// Newline-sensitive mode: `.` and negated brackets never match `\n`.
    pub newline: bool,
    /// Bracket expressions are closed under ASCII case before negation.
    pub case_insensitive: bool,
    /// Maximum nesting of groups and stacked repetitions.
    pub nest_limit: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::Extended,
            newline: false,
            case_insensitive: false,
            nest_limit: DEFAULT_NEST_LIMIT,
        }
    }
}

impl ParseOptions {
    /// Create options for the given dialect.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Default::default()
        }
    }

    /// Set newline-sensitive mode.
    #[must_use]
    pub const fn newline(mut self, enabled: bool) -> Self {
        self.newline = enabled;
        self
    }

    /// Set case-insensitive bracket handling.
    #[must_use]
    pub const fn case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    /// Set the nesting limit.
    #[must_use]
    pub const fn nest_limit(mut self, limit: u32) -> Self {
        self.nest_limit = limit;
        self
    }
}

/// Parse an extended regular expression with default options.
///
/// # Errors
///
/// Returns an error if the pattern is malformed.
pub fn parse(pattern: &[u8]) -> Result<Ast> {
    parse_with(pattern, ParseOptions::default())
}

/// Parse a pattern with explicit options.
///
/// # Errors
///
/// Returns an error if the pattern is malformed or nests too deeply.
pub fn parse_with(pattern: &[u8], options: ParseOptions) -> Result<Ast> {
    let mut parser = Parser::new(pattern, options);
    let ast = parser.parse_pattern()?;
    tracing::trace!(
        pattern = %String::from_utf8_lossy(pattern),
        dialect = ?options.dialect,
        captures = parser.next_capture - 1,
        "parsed pattern"
    );
    Ok(ast)
}

/// Parser state over a single pattern.
struct Parser<'p> {
    pattern: &'p [u8],
    pos: usize,
    options: ParseOptions,
    /// Index the next opening parenthesis will receive.
    next_capture: u32,
    /// Current group nesting.
    depth: u32,
}

impl<'p> Parser<'p> {
    const fn new(pattern: &'p [u8], options: ParseOptions) -> Self {
        Self {
            pattern,
            pos: 0,
            options,
            next_capture: 1,
            depth: 0,
        }
    }

    const fn extended(&self) -> bool {
        matches!(self.options.dialect, Dialect::Extended)
    }

    fn peek(&self) -> Option<u8> {
        self.pattern.get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.pattern.get(self.pos + n).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn starts_with(&self, s: &[u8]) -> bool {
        self.pattern[self.pos..].starts_with(s)
    }

    fn eat_seq(&mut self, s: &[u8]) -> bool {
        if self.starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    const fn at_end(&self) -> bool {
        self.pos >= self.pattern.len()
    }

    fn parse_pattern(&mut self) -> Result<Ast> {
        let ast = self.parse_alternation()?;
        if !self.at_end() {
            // Only a stray close paren can stop the top-level alternation.
            return Err(ParseError::syntax(
                ErrorCode::UnmatchedParen,
                self.pos,
                "unmatched close parenthesis",
            ));
        }
        Ok(ast)
    }

    fn at_alternation_bar(&self) -> bool {
        if self.extended() {
            self.peek() == Some(b'|')
        } else {
            self.starts_with(b"\\|")
        }
    }

    fn at_group_close(&self) -> bool {
        if self.extended() {
            self.peek() == Some(b')')
        } else {
            self.starts_with(b"\\)")
        }
    }

    fn parse_alternation(&mut self) -> Result<Ast> {
        let mut branches = vec![self.parse_concat()?];
        while self.at_alternation_bar() {
            self.pos += if self.extended() { 1 } else { 2 };
            branches.push(self.parse_concat()?);
        }
        Ok(Ast::alternation(branches))
    }

    fn parse_concat(&mut self) -> Result<Ast> {
        let mut items = Vec::new();
        // BRE: position where `*` is still literal and `^` is an anchor.
        let mut leading = true;

        while !self.at_end() && !self.at_alternation_bar() && !self.at_group_close() {
            if !self.extended() {
                if leading && self.peek() == Some(b'^') {
                    self.pos += 1;
                    items.push(Ast::Anchor(AnchorKind::LineStart));
                    continue;
                }
                if leading && self.peek() == Some(b'*') {
                    self.pos += 1;
                    let atom = self.parse_repetitions(Ast::byte(b'*'))?;
                    items.push(atom);
                    leading = false;
                    continue;
                }
            }
            leading = false;
            let atom = self.parse_atom()?;
            let atom = self.parse_repetitions(atom)?;
            items.push(atom);
        }
        Ok(Ast::concat(items))
    }

    fn parse_atom(&mut self) -> Result<Ast> {
        let start = self.pos;
        let Some(b) = self.bump() else {
            return Err(ParseError::code_at(ErrorCode::BadPattern, start));
        };

        if self.extended() {
            match b {
                b'(' => self.parse_group(start),
                b'*' | b'+' | b'?' | b'{' => Err(ParseError::syntax(
                    ErrorCode::BadRepetition,
                    start,
                    format!("repetition operator '{}' has no operand", b as char),
                )),
                b'[' => self.parse_bracket(start),
                b'.' => Ok(self.any_byte()),
                b'^' => Ok(Ast::Anchor(AnchorKind::LineStart)),
                b'$' => Ok(Ast::Anchor(AnchorKind::LineEnd)),
                b'\\' => self.parse_escape(start),
                _ => Ok(Ast::byte(b)),
            }
        } else {
            match b {
                b'[' => self.parse_bracket(start),
                b'.' => Ok(self.any_byte()),
                b'$' if self.at_end() || self.at_group_close() || self.at_alternation_bar() => {
                    Ok(Ast::Anchor(AnchorKind::LineEnd))
                }
                b'\\' => match self.peek() {
                    Some(b'(') => {
                        self.pos += 1;
                        self.parse_group(start)
                    }
                    Some(b'{' | b'+' | b'?') => Err(ParseError::syntax(
                        ErrorCode::BadRepetition,
                        start,
                        "repetition operator has no operand",
                    )),
                    _ => self.parse_escape(start),
                },
                _ => Ok(Ast::byte(b)),
            }
        }
    }

    /// `.`: any byte, minus newline in newline-sensitive mode.
    fn any_byte(&self) -> Ast {
        let mut set = ByteSet::FULL;
        if self.options.newline {
            set.remove(b'\n');
        }
        Ast::Literal(set)
    }

    /// Parse a group body; the opening delimiter at `start` is consumed.
    fn parse_group(&mut self, start: usize) -> Result<Ast> {
        self.depth += 1;
        if self.depth > self.options.nest_limit {
            return Err(ParseError::NestLimitExceeded {
                limit: self.options.nest_limit,
                offset: start,
            });
        }
        let index = self.next_capture;
        self.next_capture += 1;

        let child = self.parse_alternation()?;
        let closed = if self.extended() {
            self.eat(b')')
        } else {
            self.eat_seq(b"\\)")
        };
        if !closed {
            return Err(ParseError::syntax(
                ErrorCode::UnmatchedParen,
                start,
                "unmatched open parenthesis",
            ));
        }
        self.depth -= 1;
        Ok(Ast::group(child, index))
    }

    fn parse_repetitions(&mut self, mut atom: Ast) -> Result<Ast> {
        let mut stacked = 0u32;
        loop {
            let op_start = self.pos;
            let (min, max) = if self.extended() {
                match self.peek() {
                    Some(b'*') => {
                        self.pos += 1;
                        (0, None)
                    }
                    Some(b'+') => {
                        self.pos += 1;
                        (1, None)
                    }
                    Some(b'?') => {
                        self.pos += 1;
                        (0, Some(1))
                    }
                    Some(b'{') => {
                        self.pos += 1;
                        self.parse_interval(op_start, b"}")?
                    }
                    _ => break,
                }
            } else if self.eat(b'*') {
                (0, None)
            } else if self.eat_seq(b"\\+") {
                (1, None)
            } else if self.eat_seq(b"\\?") {
                (0, Some(1))
            } else if self.eat_seq(b"\\{") {
                self.parse_interval(op_start, b"\\}")?
            } else {
                break;
            };

            stacked += 1;
            if self.depth + stacked > self.options.nest_limit {
                return Err(ParseError::NestLimitExceeded {
                    limit: self.options.nest_limit,
                    offset: op_start,
                });
            }
            atom = Ast::repeat(atom, min, max);
        }
        Ok(atom)
    }

    /// Parse `m`, `m,`, `m,n` or `,n` up to `close`; the opening brace at
    /// `start` is consumed.
    fn parse_interval(&mut self, start: usize, close: &[u8]) -> Result<(u32, Option<u32>)> {
        let min = self.parse_bound(start)?;
        let max = if self.eat(b',') {
            self.parse_bound(start)?
        } else {
            min
        };

        if !self.eat_seq(close) {
            let code = if self.at_end() {
                ErrorCode::UnmatchedBrace
            } else {
                ErrorCode::InvalidBraceContents
            };
            return Err(ParseError::code_at(code, start));
        }

        if min.is_none() && max.is_none() {
            return Err(ParseError::syntax(
                ErrorCode::InvalidBraceContents,
                start,
                "interval has no bounds",
            ));
        }
        let min = min.unwrap_or(0);
        if let Some(max) = max.filter(|&max| min > max) {
            return Err(ParseError::syntax(
                ErrorCode::InvalidBraceContents,
                start,
                format!("interval minimum {min} exceeds maximum {max}"),
            ));
        }
        Ok((min, max))
    }

    fn parse_bound(&mut self, start: usize) -> Result<Option<u32>> {
        let digits_start = self.pos;
        let mut value: u32 = 0;
        while let Some(b) = self.peek().filter(u8::is_ascii_digit) {
            self.pos += 1;
            value = value * 10 + u32::from(b - b'0');
            if value > RE_DUP_MAX {
                return Err(ParseError::syntax(
                    ErrorCode::InvalidBraceContents,
                    start,
                    format!("interval bound exceeds {RE_DUP_MAX}"),
                ));
            }
        }
        Ok((self.pos > digits_start).then_some(value))
    }

    /// Parse the byte after a backslash; the backslash at `start` is consumed.
    fn parse_escape(&mut self, start: usize) -> Result<Ast> {
        let Some(b) = self.bump() else {
            return Err(ParseError::syntax(
                ErrorCode::TrailingEscape,
                start,
                "trailing backslash",
            ));
        };
        if let Some(set) = escape_class(b) {
            return Ok(Ast::Literal(set));
        }
        let literal = match b {
            b'1'..=b'9' => {
                return Err(ParseError::syntax(
                    ErrorCode::InvalidBackReference,
                    start,
                    "back-references are not supported",
                ));
            }
            b'n' => b'\n',
            b't' => b'\t',
            b'r' => b'\r',
            b'f' => 0x0c,
            b'v' => 0x0b,
            b if b.is_ascii_punctuation() => b,
            b => {
                return Err(ParseError::syntax(
                    ErrorCode::TrailingEscape,
                    start,
                    format!("unknown escape '\\{}'", b.escape_ascii()),
                ));
            }
        };
        Ok(Ast::byte(literal))
    }

    /// Parse a bracket expression; the `[` at `start` is consumed.
    fn parse_bracket(&mut self, start: usize) -> Result<Ast> {
        let unmatched = || ParseError::code_at(ErrorCode::UnmatchedBracket, start);
        let negate = self.eat(b'^');
        let mut set = ByteSet::new();
        let mut first = true;

        loop {
            let item_start = self.pos;
            let b = self.bump().ok_or_else(unmatched)?;
            if b == b']' && !first {
                break;
            }
            first = false;

            let lo = if b == b'[' && matches!(self.peek(), Some(b':' | b'=' | b'.')) {
                match self.parse_bracket_term(item_start)? {
                    BracketTerm::Class(class) => {
                        set.union(&class.to_set());
                        continue;
                    }
                    BracketTerm::Byte(b) => b,
                }
            } else {
                b
            };

            let is_range = self.peek() == Some(b'-')
                && self.peek_at(1).is_some_and(|next| next != b']');
            if !is_range {
                set.insert(lo);
                continue;
            }
            self.pos += 1;
            let hi_start = self.pos;
            let hi_byte = self.bump().ok_or_else(unmatched)?;
            let hi = if hi_byte == b'[' && matches!(self.peek(), Some(b'=' | b'.')) {
                match self.parse_bracket_term(hi_start)? {
                    BracketTerm::Byte(b) => b,
                    BracketTerm::Class(_) => {
                        return Err(ParseError::code_at(ErrorCode::InvalidRange, hi_start));
                    }
                }
            } else {
                hi_byte
            };
            if hi < lo {
                return Err(ParseError::syntax(
                    ErrorCode::InvalidRange,
                    item_start,
                    format!(
                        "range end '{}' precedes start '{}'",
                        hi.escape_ascii(),
                        lo.escape_ascii()
                    ),
                ));
            }
            set.insert_range(lo, hi);
        }

        if negate {
            if self.options.case_insensitive {
                set.fold_ascii_case();
            }
            set.negate();
            if self.options.newline {
                set.remove(b'\n');
            }
        }
        Ok(Ast::Literal(set))
    }

    /// Parse `[:name:]`, `[=c=]` or `[.c.]`; positioned just after the `[`.
    fn parse_bracket_term(&mut self, start: usize) -> Result<BracketTerm> {
        let Some(kind) = self.bump() else {
            return Err(ParseError::code_at(ErrorCode::UnmatchedBracket, start));
        };
        let body_start = self.pos;
        let terminator = [kind, b']'];
        let Some(len) = self.pattern[body_start..]
            .windows(2)
            .position(|w| w == terminator.as_slice())
        else {
            return Err(ParseError::code_at(ErrorCode::UnmatchedBracket, start));
        };
        let body = &self.pattern[body_start..body_start + len];
        self.pos = body_start + len + 2;

        if kind == b':' {
            return PosixClass::from_name(body)
                .map(BracketTerm::Class)
                .ok_or_else(|| {
                    ParseError::syntax(
                        ErrorCode::InvalidClass,
                        start,
                        format!("unknown class '{}'", body.escape_ascii()),
                    )
                });
        }
        match body {
            [b] => Ok(BracketTerm::Byte(*b)),
            _ => Err(ParseError::syntax(
                ErrorCode::InvalidCollation,
                start,
                "only single-byte collating elements are supported",
            )),
        }
    }
}

/// A bracketed term inside a bracket expression.
enum BracketTerm {
    Class(PosixClass),
    Byte(u8),
}
