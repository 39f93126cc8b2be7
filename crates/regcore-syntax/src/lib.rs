//! regcore-syntax: POSIX regular expression parser
//!
//! This crate turns a pattern into an [`Ast`]. It knows nothing about
//! automata or matching; the `regcore` crate lowers the tree into a program
//! and runs it.
//!
//! # Dialects
//!
//! - **Extended** (ERE): `( ) | * + ? {m,n}` are operators.
//! - **Basic** (BRE): `\( \)`, `\{m,n\}` and `*`, plus the GNU `\+ \? \|`.
//!
//! Both dialects accept bracket expressions with ranges and POSIX named
//! classes, and the class escapes `\d \w \s` with their complements.
//!
//! # Quick Start
//!
//! ```
//! use regcore_syntax::parse;
//!
//! let ast = parse(b"(a)(b(c))").unwrap();
//! assert_eq!(ast.capture_count(), 3);
//!
//! let err = parse(b"(abc").unwrap_err();
//! assert_eq!(err.code().posix_name(), "REG_EPAREN");
//! ```

pub mod ast;
pub mod class;
pub mod error;
pub mod parser;

pub use ast::{AnchorKind, Ast};
pub use class::{ByteSet, PosixClass};
pub use error::{ErrorCode, ParseError, Result};
pub use parser::{DEFAULT_NEST_LIMIT, Dialect, ParseOptions, RE_DUP_MAX, parse, parse_with};
