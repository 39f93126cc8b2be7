//! Handle-based interface over the process-wide [`global_manager`].
//!
//! These four calls mirror `regcomp`, `re_nsub`, `regexec` and `regfree`
//! for callers that want opaque handles rather than owning a
//! [`Regex`](crate::Regex).
//!
//! The shared manager is configured once. [`init`] and [`init_from_env`]
//! do so explicitly and report a bad configuration as an error. Without
//! them the first call reads `REGCORE_*` environment variables, and a value
//! that does not parse or validate is logged at `warn` level and replaced
//! by the defaults.
//!
//! ```
//! use regcore::api;
//! use regcore::{CompileFlags, MatchFlags};
//!
//! let handle = api::compile(b"(a)(b(c))", CompileFlags::EXTENDED).unwrap();
//! assert_eq!(api::subexpression_count(handle).unwrap(), 3);
//!
//! let m = api::exec(handle, b"abc", MatchFlags::empty()).unwrap().unwrap();
//! assert_eq!(m.offsets(), vec![(0, 3), (0, 1), (1, 3), (2, 3)]);
//!
//! api::release(handle).unwrap();
//! assert!(api::release(handle).unwrap_err().is_invalid_handle());
//! ```

use crate::config::EngineConfig;
use crate::error::Result;
use crate::flags::{CompileFlags, MatchFlags};
use crate::handle::{Handle, global_manager, init_global};
use crate::span::MatchResult;

/// Configure the shared manager with `config`.
///
/// # Errors
///
/// Returns a configuration error if `config` does not validate or the
/// manager is already configured, by an earlier `init` or by any other call
/// in this module.
pub fn init(config: EngineConfig) -> Result<()> {
    init_global(config).map(|_| ())
}

/// Configure the shared manager from `REGCORE_*` environment variables.
///
/// # Errors
///
/// Returns a configuration error if a variable does not parse, the result
/// does not validate, or the manager is already configured.
pub fn init_from_env() -> Result<()> {
    init(EngineConfig::from_env()?)
}

/// Compile `pattern` and return a handle to it.
///
/// # Errors
///
/// Returns the syntax or resource limit error; [`RegexError::code`]
/// gives the POSIX code and [`RegexError::offset`] the byte offset.
///
/// [`RegexError::code`]: crate::RegexError::code
/// [`RegexError::offset`]: crate::RegexError::offset
pub fn compile(pattern: &[u8], flags: CompileFlags) -> Result<Handle> {
    global_manager().compile(pattern, flags)
}

/// Number of parenthesized subexpressions in the pattern behind `handle`.
///
/// # Errors
///
/// Returns an invalid handle error if `handle` is not live.
pub fn subexpression_count(handle: Handle) -> Result<usize> {
    global_manager().subexpression_count(handle)
}

/// Search `text`. `Ok(None)` means no match.
///
/// # Errors
///
/// Returns an invalid handle error if `handle` is not live, or a resource
/// limit error from the search.
pub fn exec(handle: Handle, text: &[u8], flags: MatchFlags) -> Result<Option<MatchResult>> {
    global_manager().exec(handle, text, flags)
}

/// Release `handle`.
///
/// # Errors
///
/// Returns an invalid handle error on double release or an unknown handle.
pub fn release(handle: Handle) -> Result<()> {
    global_manager().release(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regcore_syntax::ErrorCode;

    #[test]
    fn basic_dialect_by_default() {
        let handle = compile(b"a\\{2\\}", CompileFlags::empty()).unwrap();
        assert!(exec(handle, b"aa", MatchFlags::empty()).unwrap().is_some());
        assert!(exec(handle, b"a{2}", MatchFlags::empty()).unwrap().is_none());
        release(handle).unwrap();
    }

    #[test]
    fn compile_error_code() {
        let err = compile(b"a[b", CompileFlags::EXTENDED).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::UnmatchedBracket));
        assert_eq!(err.code().map(ErrorCode::as_i32), Some(7));
    }

    #[test]
    fn notbol_flag() {
        let handle = compile(b"^x", CompileFlags::EXTENDED).unwrap();
        assert!(exec(handle, b"x", MatchFlags::NOTBOL).unwrap().is_none());
        assert!(exec(handle, b"x", MatchFlags::empty()).unwrap().is_some());
        release(handle).unwrap();
        assert!(subexpression_count(handle).unwrap_err().is_invalid_handle());
    }
}
