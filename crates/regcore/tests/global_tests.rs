//! Configuring the process-wide handle manager.
//!
//! Kept to a single test: the manager can only be configured once per
//! process.

use regcore::{CompileFlags, EngineConfig, LimitKind, MatchFlags, RegexError, api, global_manager};

#[test]
fn explicit_init_configures_shared_manager_once() {
    let bad = EngineConfig::builder().max_nesting_depth(0).build();
    let err = api::init(bad).unwrap_err();
    assert!(matches!(err, RegexError::Config { .. }));

    let config = EngineConfig::builder().max_program_size(16).build();
    api::init(config).unwrap();
    assert_eq!(global_manager().config().max_program_size, 16);

    let err = api::compile(b"abcdefghijklmnopqrstuvwxyz", CompileFlags::EXTENDED).unwrap_err();
    assert_eq!(err.limit_kind(), Some(LimitKind::ProgramSize));

    let handle = api::compile(b"ab", CompileFlags::EXTENDED).unwrap();
    assert!(api::exec(handle, b"cab", MatchFlags::empty()).unwrap().is_some());
    api::release(handle).unwrap();

    assert!(api::init(EngineConfig::default()).is_err());
    assert!(api::init_from_env().is_err());
    assert_eq!(global_manager().config().max_program_size, 16);
}
