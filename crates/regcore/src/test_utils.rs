//! Test utilities for regcore.
//!
//! This module provides a POSIX conformance table and assertion helpers
//! for tests that exercise compiled patterns.

mod assertions;
mod conformance;

pub use assertions::{MatchAssertions, assert_groups, assert_syntax_error};
pub use conformance::{ConformanceCase, conformance_cases, run_case};
