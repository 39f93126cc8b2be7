//! Match boundaries.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A half-open byte range `start..end` of the searched text.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Span {
    /// Offset of the first byte.
    pub start: usize,
    /// Offset one past the last byte.
    pub end: usize,
}

impl Span {
    /// Create a span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span is a zero-length match.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The span as a range.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The matched bytes of `text`.
    #[must_use]
    pub fn slice<'t>(&self, text: &'t [u8]) -> &'t [u8] {
        &text[self.range()]
    }

    /// The span as `regmatch_t`-style signed offsets.
    #[must_use]
    pub fn to_offsets(self) -> (i64, i64) {
        (to_offset(self.start), to_offset(self.end))
    }
}

fn to_offset(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.range()
    }
}

/// Capture spans of one successful match.
///
/// Index 0 is the whole match and is always present; index `i` is the `i`th
/// subexpression, `None` when it took no part in the match. Patterns
/// compiled with `NOSUB` report only index 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchResult {
    groups: Vec<Option<Span>>,
}

impl MatchResult {
    pub(crate) fn new(groups: Vec<Option<Span>>) -> Self {
        debug_assert!(groups.first().is_some_and(Option::is_some));
        Self { groups }
    }

    /// The whole match.
    #[must_use]
    pub fn span(&self) -> Span {
        self.groups.first().copied().flatten().unwrap_or_default()
    }

    /// Span of group `index`, `None` if it did not participate or does not
    /// exist.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Span> {
        self.groups.get(index).copied().flatten()
    }

    /// Number of reported groups, including the whole match.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Always false: the whole match is always reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over every reported group.
    pub fn iter(&self) -> impl Iterator<Item = Option<Span>> + '_ {
        self.groups.iter().copied()
    }

    /// The bytes of `text` matched by group `index`.
    #[must_use]
    pub fn group<'t>(&self, text: &'t [u8], index: usize) -> Option<&'t [u8]> {
        self.get(index).map(|span| span.slice(text))
    }

    /// All groups as signed offsets, `(-1, -1)` for groups that did not
    /// participate.
    #[must_use]
    pub fn offsets(&self) -> Vec<(i64, i64)> {
        self.groups
            .iter()
            .map(|group| group.map_or((-1, -1), Span::to_offsets))
            .collect()
    }

    /// The underlying spans.
    #[must_use]
    pub fn as_slice(&self) -> &[Option<Span>] {
        &self.groups
    }
}
