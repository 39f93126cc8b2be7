//! Configuration loading and application tests.

use std::fs;
use std::path::PathBuf;

use regcore::config::{parse_config, vars};
use regcore::{
    ConfigFormat, ConfigLoader, DEFAULT_MAX_PROGRAM_SIZE, EngineConfig, EnvConfig, HandleManager,
    LimitKind, MAX_NESTING_DEPTH_CAP, Regex, RegexError,
};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("regcore-config-{name}-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.max_program_size, DEFAULT_MAX_PROGRAM_SIZE);
    assert!(config.max_match_steps.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn toml_partial_keeps_defaults() {
    let config = parse_config("max_match_steps = 5000\n", ConfigFormat::Toml).unwrap();
    assert_eq!(config.max_match_steps, Some(5000));
    assert_eq!(config.max_program_size, DEFAULT_MAX_PROGRAM_SIZE);
}

#[test]
fn json_config() {
    let json = r#"{"max_program_size": 512, "max_nesting_depth": 8}"#;
    let config = parse_config(json, ConfigFormat::Json).unwrap();
    assert_eq!(config.max_program_size, 512);
    assert_eq!(config.max_nesting_depth, 8);
}

#[test]
fn unknown_keys_are_rejected() {
    assert!(parse_config("max_states = 1\n", ConfigFormat::Toml).is_err());
    assert!(parse_config(r#"{"threads": 4}"#, ConfigFormat::Json).is_err());
}

#[test]
fn invalid_values_are_rejected() {
    assert!(parse_config("max_program_size = 0\n", ConfigFormat::Toml).is_err());
    assert!(parse_config("max_program_size = -1\n", ConfigFormat::Toml).is_err());
}

#[test]
fn loader_finds_by_name() {
    let dir = scratch_dir("find");
    fs::write(dir.join("engine.toml"), "max_program_size = 64\n").unwrap();

    let loader = ConfigLoader::new().add_path(&dir);
    let config = loader.load_by_name("engine").unwrap();
    assert_eq!(config.max_program_size, 64);

    assert!(loader.load_by_name("missing").is_err());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn loader_uses_default_format() {
    let dir = scratch_dir("default-format");
    let path = dir.join("limits.conf");
    fs::write(&path, r#"{"max_match_steps": 77}"#).unwrap();

    assert!(ConfigLoader::new().load(&path).is_err());
    let config = ConfigLoader::new().with_format(ConfigFormat::Json).load(&path).unwrap();
    assert_eq!(config.max_match_steps, Some(77));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_file_reports_path() {
    let path = std::env::temp_dir().join("regcore-does-not-exist.toml");
    let err = ConfigLoader::new().load(&path).unwrap_err();
    assert!(err.to_string().contains("regcore-does-not-exist.toml"));
}

#[test]
fn env_overrides_feed_the_engine() {
    let mut env = EnvConfig::new("REGCORE_IT_ENV");
    env.set(vars::MAX_PROGRAM_SIZE, "10");
    let config = env.apply(EngineConfig::default()).unwrap();

    let err = Regex::builder("abcdefghijkl").config(config).build().unwrap_err();
    assert_eq!(err.limit_kind(), Some(LimitKind::ProgramSize));

    let manager = HandleManager::with_config(config);
    assert_eq!(manager.config().max_program_size, 10);
}

#[test]
fn env_unlimited_steps() {
    let mut env = EnvConfig::new("REGCORE_IT_STEPS");
    env.set(vars::MAX_MATCH_STEPS, "unlimited");
    let base = EngineConfig::builder().max_match_steps(5).build();
    assert_eq!(env.apply(base).unwrap().max_match_steps, None);
}

#[test]
fn env_bad_value_is_error() {
    let mut env = EnvConfig::new("REGCORE_IT_BAD");
    env.set(vars::MAX_NESTING_DEPTH, "deep");
    assert!(env.apply(EngineConfig::default()).is_err());
}

#[test]
fn nesting_depth_is_capped() {
    let deep = EngineConfig::builder().max_nesting_depth(100_000).build();
    assert!(deep.validate().is_err());

    let pattern = format!("{}a{}", "(".repeat(50_000), ")".repeat(50_000));
    let err = Regex::builder(&pattern).config(deep).build().unwrap_err();
    assert!(matches!(err, RegexError::Config { .. }));

    let toml = format!("max_nesting_depth = {}\n", MAX_NESTING_DEPTH_CAP + 1);
    assert!(parse_config(&toml, ConfigFormat::Toml).is_err());

    let mut env = EnvConfig::new("REGCORE_IT_DEEP");
    env.set(vars::MAX_NESTING_DEPTH, "100000");
    assert!(env.apply(EngineConfig::default()).is_err());
    env.set(vars::MAX_NESTING_DEPTH, MAX_NESTING_DEPTH_CAP.to_string());
    assert_eq!(
        env.apply(EngineConfig::default()).unwrap().max_nesting_depth,
        MAX_NESTING_DEPTH_CAP
    );
}

#[test]
fn env_match_state_limit() {
    let mut env = EnvConfig::new("REGCORE_IT_STATE");
    env.set(vars::MAX_MATCH_STATE, "32");
    let config = env.apply(EngineConfig::default()).unwrap();
    assert_eq!(config.max_match_state, 32);

    let err = Regex::builder("(a)(b)(c)").config(config).build().unwrap_err();
    assert_eq!(err.limit_kind(), Some(LimitKind::MatchState));
    assert!(Regex::builder("abc").config(config).build().is_ok());
}

#[test]
fn config_travels_with_regex() {
    let config = EngineConfig::builder().max_match_steps(1_000).build();
    let re = Regex::builder("a+").config(config).build().unwrap();
    assert_eq!(re.config().max_match_steps, Some(1_000));
    assert_eq!(re.state().steps(), 0);
}
