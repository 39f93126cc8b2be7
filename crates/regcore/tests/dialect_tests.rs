//! BRE and ERE syntax, compile flags and iteration.

use regcore::{CompileFlags, Regex, Span};

fn bre(pattern: &str) -> Regex {
    Regex::with_flags(pattern.as_bytes(), CompileFlags::empty()).unwrap()
}

fn find(re: &Regex, text: &str) -> Option<(usize, usize)> {
    re.find(text).unwrap().map(|s| (s.start, s.end))
}

#[test]
fn bre_operators_are_escaped() {
    let re = bre(r"\(ab\)\{2\}");
    assert_eq!(re.subexpression_count(), 1);
    assert_eq!(find(&re, "xababy"), Some((1, 5)));

    // Unescaped ERE operators are literals in BRE.
    let re = bre("a+b?(c)");
    assert_eq!(re.subexpression_count(), 0);
    assert_eq!(find(&re, "xa+b?(c)"), Some((1, 8)));
}

#[test]
fn bre_leading_star_is_literal() {
    let re = bre("*a");
    assert_eq!(find(&re, "b*a"), Some((1, 3)));
    assert!(!re.is_match("a").unwrap());
}

#[test]
fn bre_gnu_extensions() {
    assert_eq!(find(&bre(r"ab\+"), "abbb"), Some((0, 4)));
    assert_eq!(find(&bre(r"ab\?c"), "ac"), Some((0, 2)));
    assert_eq!(find(&bre(r"cat\|dog"), "hotdog"), Some((3, 6)));
}

#[test]
fn bre_dollar_is_literal_mid_pattern() {
    let re = bre("a$b");
    assert_eq!(find(&re, "a$b"), Some((0, 3)));
    assert_eq!(find(&bre("ab$"), "abab"), Some((2, 4)));
}

#[test]
fn ere_intervals() {
    let re = Regex::new("x{2,}").unwrap();
    assert_eq!(find(&re, "x xx xxxxx"), Some((2, 4)));
    let re = Regex::new("x{,2}y").unwrap();
    assert_eq!(find(&re, "xxxy"), Some((1, 4)));
    let re = Regex::new("(ab){0}c").unwrap();
    assert_eq!(find(&re, "abc"), Some((2, 3)));
}

#[test]
fn bracket_expressions() {
    let re = Regex::new("[]a]+").unwrap();
    assert_eq!(find(&re, "x]a]"), Some((1, 4)));

    let re = Regex::new("[^]a]").unwrap();
    assert_eq!(find(&re, "]ab"), Some((2, 3)));

    let re = Regex::new("[a-]+").unwrap();
    assert_eq!(find(&re, "-a-b"), Some((0, 3)));

    let re = Regex::new(r"[\n]").unwrap();
    assert_eq!(find(&re, "ab\\"), Some((2, 3)));
}

#[test]
fn character_classes() {
    let re = Regex::new("[[:digit:][:upper:]]+").unwrap();
    assert_eq!(find(&re, "abC3D9e"), Some((2, 6)));

    let re = Regex::new("[[:space:]]").unwrap();
    assert_eq!(find(&re, "a\tb"), Some((1, 2)));

    let re = Regex::new("[[=e=]]").unwrap();
    assert_eq!(find(&re, "abe"), Some((2, 3)));
}

#[test]
fn case_insensitive_flag() {
    let re = Regex::builder("[a-c]+X").case_insensitive(true).build().unwrap();
    assert_eq!(find(&re, "zzABcx"), Some((2, 6)));

    let re = Regex::builder("[^a]").case_insensitive(true).build().unwrap();
    assert_eq!(find(&re, "aAb"), Some((2, 3)));
}

#[test]
fn newline_flag_splits_lines() {
    let re = Regex::builder("^b.*$").newline(true).build().unwrap();
    assert_eq!(find(&re, "a\nbcd\ne"), Some((2, 5)));

    let plain = Regex::new("^b.*$").unwrap();
    assert_eq!(find(&plain, "a\nbcd\ne"), None);
    assert_eq!(find(&plain, "bcd\ne"), Some((0, 5)));
}

#[test]
fn newline_flag_excludes_newline_from_negated_sets() {
    let re = Regex::builder("a[^x]b").newline(true).build().unwrap();
    assert!(!re.is_match("a\nb").unwrap());
    assert!(Regex::new("a[^x]b").unwrap().is_match("a\nb").unwrap());
}

#[test]
fn full_match() {
    let re = Regex::new("[a-z]+").unwrap();
    assert!(re.is_full_match("hello").unwrap());
    assert!(!re.is_full_match("hello world").unwrap());
}

#[test]
fn find_iter_over_lines() {
    let re = Regex::builder(r"^\([a-z]*\)=\(.*\)$")
        .extended(false)
        .newline(true)
        .build()
        .unwrap();
    let text = b"a=1\nbb=22\n#c\n";
    let keys: Vec<&[u8]> = re
        .find_iter(text)
        .map(|m| m.unwrap().group(text, 1).unwrap())
        .collect();
    assert_eq!(keys, vec![&b"a"[..], &b"bb"[..]]);
}

#[test]
fn raw_bytes() {
    let re = Regex::with_flags(b"\xff[\x80-\xfe]", CompileFlags::EXTENDED).unwrap();
    let m = re.captures(b"a\xff\x90").unwrap().unwrap();
    assert_eq!(m.span(), Span::new(1, 3));
}
