//! Error reporting tests.

use regcore::{CompileFlags, EngineConfig, ErrorCode, LimitKind, MatchOptions, Regex, RegexError};

fn ere(pattern: &str) -> RegexError {
    Regex::new(pattern).unwrap_err()
}

fn bre(pattern: &str) -> RegexError {
    Regex::with_flags(pattern.as_bytes(), CompileFlags::empty()).unwrap_err()
}

#[test]
fn syntax_error_codes() {
    let cases = [
        ("(abc", ErrorCode::UnmatchedParen),
        ("abc)", ErrorCode::UnmatchedParen),
        ("[abc", ErrorCode::UnmatchedBracket),
        ("[z-a]", ErrorCode::InvalidRange),
        ("[[:bogus:]]", ErrorCode::InvalidClass),
        ("a{2,1}", ErrorCode::InvalidBraceContents),
        ("a{1", ErrorCode::UnmatchedBrace),
        ("*a", ErrorCode::BadRepetition),
        ("a\\", ErrorCode::TrailingEscape),
        (r"(a)\1", ErrorCode::InvalidBackReference),
    ];
    for (pattern, code) in cases {
        let err = ere(pattern);
        assert!(err.is_syntax(), "{pattern}: {err}");
        assert_eq!(err.code(), Some(code), "{pattern}");
    }
}

#[test]
fn bre_syntax_errors() {
    assert_eq!(bre(r"\(a").code(), Some(ErrorCode::UnmatchedParen));
    assert_eq!(bre(r"a\{1").code(), Some(ErrorCode::UnmatchedBrace));
    assert_eq!(bre("[a").code(), Some(ErrorCode::UnmatchedBracket));
}

#[test]
fn offsets_point_at_the_problem() {
    assert_eq!(ere("(abc").offset(), Some(0));
    assert_eq!(ere("abc)").offset(), Some(3));
    assert_eq!(ere("x[abc").offset(), Some(1));
    assert_eq!(ere("ab(cd").offset(), Some(2));
}

#[test]
fn codes_follow_glibc_numbering() {
    assert_eq!(ErrorCode::NoMatch.as_i32(), 1);
    assert_eq!(ErrorCode::UnmatchedBracket.as_i32(), 7);
    assert_eq!(ErrorCode::UnmatchedParen.as_i32(), 8);
    assert_eq!(ErrorCode::OutOfSpace.as_i32(), 12);
    assert_eq!(ErrorCode::BadRepetition.as_i32(), 13);
}

#[test]
fn syntax_display_shows_caret() {
    let msg = ere("ab[cd").to_string();
    assert!(msg.contains("REG_EBRACK"), "{msg}");
    assert!(msg.contains("offset 2"), "{msg}");
    assert!(msg.contains("  ab[cd\n    ^"), "{msg}");
}

#[test]
fn program_size_limit() {
    let config = EngineConfig::builder().max_program_size(16).build();
    let err = Regex::builder("a{20}").config(config).build().unwrap_err();
    assert!(err.is_resource_limit());
    assert_eq!(err.limit_kind(), Some(LimitKind::ProgramSize));
    assert_eq!(err.code(), Some(ErrorCode::OutOfSpace));
    assert!(err.to_string().contains("program size"));

    let config = EngineConfig::builder().max_program_size(64).build();
    assert!(Regex::builder("a{20}").config(config).build().is_ok());
}

#[test]
fn nesting_limit() {
    let config = EngineConfig::builder().max_nesting_depth(4).build();
    let err = Regex::builder("((((a))))").config(config).build().unwrap_err();
    assert_eq!(err.limit_kind(), Some(LimitKind::NestingDepth));
    assert!(Regex::builder("(((a)))").config(config).build().is_ok());
}

#[test]
fn match_step_limit() {
    let config = EngineConfig::builder().max_match_steps(300).build();
    let re = Regex::builder("(a|aa)*b").config(config).build().unwrap();
    let text = "a".repeat(1000);
    let err = re.exec(&text, &MatchOptions::new()).unwrap_err();
    assert_eq!(err.limit_kind(), Some(LimitKind::MatchSteps));

    // Short inputs stay under the ceiling.
    assert!(re.is_match("aab").unwrap());
}

#[test]
fn unlimited_steps() {
    let config = EngineConfig::builder().unlimited_match_steps().build();
    let re = Regex::builder("(a|aa)*b").config(config).build().unwrap();
    let text = "a".repeat(2000);
    assert!(!re.is_match(&text).unwrap());
}

#[test]
fn invalid_config_is_rejected() {
    let config = EngineConfig::builder().max_program_size(0).build();
    let err = Regex::builder("a").config(config).build().unwrap_err();
    assert!(matches!(err, RegexError::Config { .. }), "{err}");
}
