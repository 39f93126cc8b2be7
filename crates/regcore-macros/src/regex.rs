//! Compile-time validated pattern macro implementation.

use proc_macro2::TokenStream;
use quote::quote;
use regcore_syntax::{Dialect, ParseOptions};
use syn::parse::{Parse, ParseStream};
use syn::{Ident, LitStr, Result, Token};

/// A flag accepted after the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// Basic (BRE) syntax.
    Basic,
    /// Ignore ASCII case.
    Icase,
    /// Newline-sensitive matching.
    Newline,
    /// Report only the whole match.
    Nosub,
}

impl Flag {
    fn from_ident(ident: &Ident) -> Result<Self> {
        match ident.to_string().as_str() {
            "basic" => Ok(Self::Basic),
            "icase" => Ok(Self::Icase),
            "newline" => Ok(Self::Newline),
            "nosub" => Ok(Self::Nosub),
            other => Err(syn::Error::new(
                ident.span(),
                format!("unknown flag `{other}`; expected basic, icase, newline or nosub"),
            )),
        }
    }
}

/// The regex! macro input.
pub struct RegexInput {
    /// The pattern string.
    pub pattern: LitStr,
    /// Flags, in the order given.
    pub flags: Vec<Flag>,
}

impl Parse for RegexInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let pattern: LitStr = input.parse()?;
        let mut flags = Vec::new();
        while input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                break;
            }
            let ident: Ident = input.parse()?;
            let flag = Flag::from_ident(&ident)?;
            if flags.contains(&flag) {
                return Err(syn::Error::new(ident.span(), "duplicate flag"));
            }
            flags.push(flag);
        }
        Ok(Self { pattern, flags })
    }
}

impl RegexInput {
    fn has(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    fn parse_options(&self) -> ParseOptions {
        let dialect = if self.has(Flag::Basic) {
            Dialect::Basic
        } else {
            Dialect::Extended
        };
        ParseOptions::new(dialect)
            .newline(self.has(Flag::Newline))
            .case_insensitive(self.has(Flag::Icase))
    }
}

/// Generate code for the regex! macro.
pub fn expand(input: RegexInput) -> TokenStream {
    let pattern = input.pattern.value();

    // Validate the pattern at compile time
    if let Err(e) = regcore_syntax::parse_with(pattern.as_bytes(), input.parse_options()) {
        return syn::Error::new(input.pattern.span(), format!("invalid pattern: {e}"))
            .to_compile_error();
    }

    let mut flags = Vec::new();
    if !input.has(Flag::Basic) {
        flags.push(quote! { ::regcore::CompileFlags::EXTENDED });
    }
    if input.has(Flag::Icase) {
        flags.push(quote! { ::regcore::CompileFlags::ICASE });
    }
    if input.has(Flag::Newline) {
        flags.push(quote! { ::regcore::CompileFlags::NEWLINE });
    }
    if input.has(Flag::Nosub) {
        flags.push(quote! { ::regcore::CompileFlags::NOSUB });
    }

    let lit = &input.pattern;

    quote! {
        {
            static REGEX: ::regcore::__private::OnceLock<::regcore::Regex> =
                ::regcore::__private::OnceLock::new();
            REGEX.get_or_init(|| {
                let flags = ::regcore::CompileFlags::empty() #(| #flags)*;
                ::regcore::Regex::with_flags(#lit.as_bytes(), flags)
                    .expect("pattern was validated at compile time")
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn parse_pattern_only() {
        let input: RegexInput = parse_quote! {
            r"[[:digit:]]+"
        };
        assert_eq!(input.pattern.value(), "[[:digit:]]+");
        assert!(input.flags.is_empty());
    }

    #[test]
    fn parse_flags() {
        let input: RegexInput = parse_quote! {
            "abc", icase, newline,
        };
        assert_eq!(input.flags, vec![Flag::Icase, Flag::Newline]);
        assert!(input.parse_options().newline);
        assert_eq!(input.parse_options().dialect, Dialect::Extended);
    }

    #[test]
    fn basic_flag_selects_dialect() {
        let input: RegexInput = parse_quote! { r"\(a\)", basic };
        assert_eq!(input.parse_options().dialect, Dialect::Basic);
        let tokens = expand(input).to_string();
        assert!(!tokens.contains("compile_error"));
        assert!(!tokens.contains("EXTENDED"));
    }

    #[test]
    fn unknown_flag_rejected() {
        let result: Result<RegexInput> = syn::parse2(quote! { "a", global });
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_flag_rejected() {
        let result: Result<RegexInput> = syn::parse2(quote! { "a", icase, icase });
        assert!(result.is_err());
    }

    #[test]
    fn invalid_pattern_expands_to_compile_error() {
        let input: RegexInput = parse_quote! { "(abc" };
        let tokens = expand(input).to_string();
        assert!(tokens.contains("compile_error"));
        assert!(tokens.contains("REG_EPAREN"));
    }
}
