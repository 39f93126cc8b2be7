//! Property tests for compiling and matching.
//!
//! The `regex` crate serves as an oracle for patterns whose meaning is the
//! same in both engines. Match existence and the leftmost start agree;
//! the POSIX match is never shorter than the leftmost-first one.

use proptest::prelude::*;
use regcore::{Regex, Span};

/// Patterns using only constructs with identical meaning in both engines.
fn shared_pattern() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        "[abc]",
        Just("[ab]".to_string()),
        Just("[^a]".to_string()),
        Just(".".to_string()),
    ];
    leaf.prop_recursive(4, 24, 4, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a}{b}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a}|{b})")),
            inner.clone().prop_map(|a| format!("({a})*")),
            inner.clone().prop_map(|a| format!("({a})+")),
            inner.clone().prop_map(|a| format!("({a})?")),
            inner.prop_map(|a| format!("({a}){{1,3}}")),
        ]
    })
}

fn text() -> impl Strategy<Value = String> {
    "[abc]{0,12}"
}

fn oracle(pattern: &str) -> regex::bytes::Regex {
    regex::bytes::Regex::new(pattern).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn match_existence_agrees(pattern in shared_pattern(), text in text()) {
        let re = Regex::new(&pattern).unwrap();
        let expected = oracle(&pattern).is_match(text.as_bytes());
        prop_assert_eq!(re.is_match(&text).unwrap(), expected, "pattern {}", pattern);
    }

    #[test]
    fn leftmost_start_agrees_and_longest_wins(pattern in shared_pattern(), text in text()) {
        let ours = Regex::new(&pattern).unwrap().find(&text).unwrap();
        let theirs = oracle(&pattern).find(text.as_bytes());
        match (ours, theirs) {
            (Some(ours), Some(theirs)) => {
                prop_assert_eq!(ours.start, theirs.start(), "pattern {}", pattern);
                prop_assert!(ours.end >= theirs.end(), "pattern {}", pattern);
            }
            (None, None) => {}
            (ours, theirs) => {
                let theirs = theirs.map(|m| m.range());
                prop_assert!(false, "pattern {}: {:?} vs {:?}", pattern, ours, theirs);
            }
        }
    }

    #[test]
    fn literal_search_finds_first_occurrence(
        needle in "[a-z]{1,4}",
        hay in "[a-z]{0,24}",
    ) {
        let re = Regex::new(&needle).unwrap();
        let expected = hay.find(&needle).map(|start| Span::new(start, start + needle.len()));
        prop_assert_eq!(re.find(&hay).unwrap(), expected);
    }

    #[test]
    fn matching_is_deterministic(pattern in shared_pattern(), text in text()) {
        let re = Regex::new(&pattern).unwrap();
        let first = re.captures(&text).unwrap();
        let second = re.captures(&text).unwrap();
        prop_assert_eq!(&first, &second);

        let again = Regex::new(&pattern).unwrap();
        prop_assert_eq!(again.captures(&text).unwrap(), first);
    }

    #[test]
    fn groups_nest_inside_the_match(pattern in shared_pattern(), text in text()) {
        let re = Regex::new(&pattern).unwrap();
        if let Some(m) = re.captures(&text).unwrap() {
            prop_assert_eq!(m.len(), re.subexpression_count() + 1);
            let whole = m.span();
            for group in m.iter().flatten() {
                prop_assert!(group.start <= group.end);
                prop_assert!(whole.start <= group.start && group.end <= whole.end);
            }
        }
    }

    #[test]
    fn subexpression_count_matches_parser(pattern in shared_pattern()) {
        let ast = regcore_syntax::parse(pattern.as_bytes()).unwrap();
        prop_assert_eq!(Regex::new(&pattern).unwrap().subexpression_count(), ast.capture_count());
    }

    #[test]
    fn arbitrary_patterns_never_panic(
        pattern in proptest::collection::vec(any::<u8>(), 0..24),
        text in proptest::collection::vec(any::<u8>(), 0..24),
    ) {
        if let Ok(re) = Regex::with_flags(&pattern, regcore::CompileFlags::EXTENDED) {
            let _ = re.captures(&text);
        }
    }
}
