//! POSIX conformance fixtures.

use crate::flags::CompileFlags;
use crate::regex::Regex;

/// Expected spans per group, `None` for groups that do not participate.
pub type Expected = Vec<Option<(usize, usize)>>;

/// A single conformance case.
#[derive(Debug, Clone)]
pub struct ConformanceCase {
    /// Pattern source.
    pub pattern: &'static str,
    /// Compile flags.
    pub flags: CompileFlags,
    /// Subject text.
    pub text: &'static str,
    /// Expected groups, or `None` when the pattern must not match.
    pub expected: Option<Expected>,
}

impl ConformanceCase {
    /// A case compiled with extended syntax.
    #[must_use]
    pub fn ere(pattern: &'static str, text: &'static str, expected: Option<Expected>) -> Self {
        Self {
            pattern,
            flags: CompileFlags::EXTENDED,
            text,
            expected,
        }
    }

    /// A case compiled with basic syntax.
    #[must_use]
    pub fn bre(pattern: &'static str, text: &'static str, expected: Option<Expected>) -> Self {
        Self {
            pattern,
            flags: CompileFlags::empty(),
            text,
            expected,
        }
    }

    /// Add compile flags.
    #[must_use]
    pub fn with_flags(mut self, flags: CompileFlags) -> Self {
        self.flags |= flags;
        self
    }
}

fn spans(groups: &[(usize, usize)]) -> Option<Expected> {
    Some(groups.iter().copied().map(Some).collect())
}

/// The conformance table.
#[must_use]
pub fn conformance_cases() -> Vec<ConformanceCase> {
    vec![
        ConformanceCase::ere("a|ab", "ab", spans(&[(0, 2)])),
        ConformanceCase::ere("ab|a", "ab", spans(&[(0, 2)])),
        ConformanceCase::ere("a*", "", spans(&[(0, 0)])),
        ConformanceCase::ere("x*", "abc", spans(&[(0, 0)])),
        ConformanceCase::ere("^abc$", "abc", spans(&[(0, 3)])),
        ConformanceCase::ere("^abc$", "xabc", None),
        ConformanceCase::ere("^abc$", "abcx", None),
        ConformanceCase::ere("(a)(b(c))", "abc", spans(&[(0, 3), (0, 1), (1, 3), (2, 3)])),
        ConformanceCase::ere(
            "(a|ab)(c|bcd)(d*)",
            "abcd",
            spans(&[(0, 4), (0, 2), (2, 3), (3, 4)]),
        ),
        ConformanceCase::ere("(ab|a)(bc|c)", "abc", spans(&[(0, 3), (0, 2), (2, 3)])),
        ConformanceCase::ere(
            "(wee|week)(knights|night)",
            "weeknights",
            spans(&[(0, 10), (0, 3), (3, 10)]),
        ),
        ConformanceCase::ere("(.*)c(.*)", "abcde", spans(&[(0, 5), (0, 2), (3, 5)])),
        ConformanceCase::ere("(a*)+", "-", spans(&[(0, 0), (0, 0)])),
        ConformanceCase::ere("(a*)*", "-", spans(&[(0, 0), (0, 0)])),
        ConformanceCase::ere("(a|aa)*", "aaa", spans(&[(0, 3), (2, 3)])),
        ConformanceCase::ere("(aa|a)*", "aaa", spans(&[(0, 3), (2, 3)])),
        ConformanceCase::ere("(a{0,2})*", "aaa", spans(&[(0, 3), (2, 3)])),
        ConformanceCase::ere("(a|aa){2}", "aaa", spans(&[(0, 3), (2, 3)])),
        ConformanceCase::ere(
            "((..)|(.))*",
            "aaa",
            spans(&[(0, 3), (2, 3), (0, 2), (2, 3)]),
        ),
        ConformanceCase::ere("(ab)*", "ababab", spans(&[(0, 6), (4, 6)])),
        ConformanceCase::ere("(a)|b", "b", Some(vec![Some((0, 1)), None])),
        ConformanceCase::ere("a{2,3}", "aaaa", spans(&[(0, 3)])),
        ConformanceCase::ere("a{2}", "a", None),
        ConformanceCase::ere("[[:digit:]]+", "ab123c", spans(&[(2, 5)])),
        ConformanceCase::ere("[^a-c]+", "abxyc", spans(&[(2, 4)])),
        ConformanceCase::ere("a.c", "a\nc", spans(&[(0, 3)])),
        ConformanceCase::ere("a.c", "a\nc", None).with_flags(CompileFlags::NEWLINE),
        ConformanceCase::ere("^b$", "a\nb\nc", spans(&[(2, 3)]))
            .with_flags(CompileFlags::NEWLINE),
        ConformanceCase::ere("abc", "xABC", spans(&[(1, 4)])).with_flags(CompileFlags::ICASE),
        ConformanceCase::ere("(a)(b)", "ab", spans(&[(0, 2)])).with_flags(CompileFlags::NOSUB),
        ConformanceCase::bre(r"\(a*\)b", "aab", spans(&[(0, 3), (0, 2)])),
        ConformanceCase::bre("a+b?", "a+b?", spans(&[(0, 4)])),
        ConformanceCase::bre(r"a\{2\}", "aaa", spans(&[(0, 2)])),
        ConformanceCase::bre("*a", "x*a", spans(&[(1, 3)])),
        ConformanceCase::bre(r"a\|b", "b", spans(&[(0, 1)])),
    ]
}

/// Run one case, describing the mismatch on failure.
///
/// # Errors
///
/// Returns a message if the pattern fails to compile or the groups differ.
pub fn run_case(case: &ConformanceCase) -> Result<(), String> {
    let regex = Regex::with_flags(case.pattern.as_bytes(), case.flags)
        .map_err(|e| format!("{:?}: compile failed: {e}", case.pattern))?;
    let found = regex
        .captures(case.text)
        .map_err(|e| format!("{:?}: search failed: {e}", case.pattern))?
        .map(|m| {
            m.iter()
                .map(|g| g.map(|s| (s.start, s.end)))
                .collect::<Expected>()
        });
    if found == case.expected {
        Ok(())
    } else {
        Err(format!(
            "{:?} ({:?}) on {:?}: expected {:?}, got {found:?}",
            case.pattern, case.flags, case.text, case.expected
        ))
    }
}
