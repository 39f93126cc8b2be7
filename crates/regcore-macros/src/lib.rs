//! regcore-macros: Procedural macros for regcore
//!
//! - [`regex!`] - Compile-time validated POSIX patterns
//!
//! Use the macro through the `regcore` crate, which re-exports it; the
//! expansion refers to `::regcore` paths.

// In proc-macro crates, passing parsed input by value is idiomatic
#![allow(clippy::needless_pass_by_value)]

use proc_macro::TokenStream;
use syn::parse_macro_input;

mod regex;

/// Compile-time validated pattern.
///
/// Expands to a `&'static regcore::Regex` that is compiled on first use.
/// The pattern is an ERE unless `basic` is given; syntax errors are
/// reported at the pattern literal when the calling crate is built.
///
/// Optional flags after the pattern: `basic`, `icase`, `newline`, `nosub`.
///
/// # Example
///
/// ```ignore
/// use regcore::regex;
///
/// let date = regex!(r"([0-9]{4})-([0-9]{2})-([0-9]{2})");
/// let word = regex!("[[:alpha:]]+", icase);
/// let line = regex!(r"^\(.*\)$", basic, newline);
///
/// // Invalid pattern - compilation error
/// // let bad = regex!("(unclosed");
/// ```
#[proc_macro]
pub fn regex(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as regex::RegexInput);
    regex::expand(input).into()
}
