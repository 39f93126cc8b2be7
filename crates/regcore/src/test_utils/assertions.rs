//! Custom assertion helpers for pattern tests.

use regcore_syntax::ErrorCode;

use crate::flags::CompileFlags;
use crate::regex::Regex;
use crate::span::Span;

/// Assertion helpers for compiled patterns.
pub trait MatchAssertions {
    /// The regex under test.
    fn regex(&self) -> &Regex;

    /// Assert that the whole match of `text` is `start..end`.
    fn assert_span(&self, text: &str, start: usize, end: usize) {
        let re = self.regex();
        let found = re.find(text).expect("search failed");
        assert_eq!(
            found,
            Some(Span::new(start, end)),
            "Expected {re} to match {text:?} at {start}..{end}, but got {found:?}"
        );
    }

    /// Assert that `text` does not match.
    fn assert_no_match(&self, text: &str) {
        let re = self.regex();
        let found = re.find(text).expect("search failed");
        assert!(
            found.is_none(),
            "Expected {re} NOT to match {text:?}, but it matched at {found:?}"
        );
    }

    /// Assert the matched bytes of group `index`.
    fn assert_group(&self, text: &str, index: usize, expected: Option<&str>) {
        let re = self.regex();
        let m = re
            .captures(text)
            .expect("search failed")
            .unwrap_or_else(|| panic!("Expected {re} to match {text:?}"));
        let group = m.group(text.as_bytes(), index);
        assert_eq!(
            group,
            expected.map(str::as_bytes),
            "Group {index} of {re} on {text:?}"
        );
    }
}

impl MatchAssertions for Regex {
    fn regex(&self) -> &Self {
        self
    }
}

/// Assert every group span of an ERE match.
pub fn assert_groups(pattern: &str, text: &str, expected: &[Option<(usize, usize)>]) {
    let re = Regex::new(pattern).unwrap_or_else(|e| panic!("Invalid pattern {pattern:?}: {e}"));
    let m = re
        .captures(text)
        .expect("search failed")
        .unwrap_or_else(|| panic!("Expected {pattern:?} to match {text:?}"));
    let found: Vec<Option<(usize, usize)>> =
        m.iter().map(|g| g.map(|s| (s.start, s.end))).collect();
    assert_eq!(found, expected, "Groups of {pattern:?} on {text:?}");
}

/// Assert that compiling `pattern` fails with `code`.
pub fn assert_syntax_error(pattern: &str, flags: CompileFlags, code: ErrorCode) {
    match Regex::with_flags(pattern.as_bytes(), flags) {
        Ok(_) => panic!("Expected {pattern:?} to fail with {code}, but it compiled"),
        Err(err) => assert_eq!(
            err.code(),
            Some(code),
            "Expected {pattern:?} to fail with {code}, got: {err}"
        ),
    }
}
