//! File-based configuration loading.

use std::path::{Path, PathBuf};

use super::EngineConfig;
use crate::error::{RegexError, Result};

/// Configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Detect format from path.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Configuration file loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Search paths.
    search_paths: Vec<PathBuf>,
    /// Format used when the extension says nothing.
    default_format: Option<ConfigFormat>,
}

impl ConfigLoader {
    /// Create a new loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a search path.
    #[must_use]
    pub fn add_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Set default format.
    #[must_use]
    pub const fn with_format(mut self, format: ConfigFormat) -> Self {
        self.default_format = Some(format);
        self
    }

    /// Find a config file by name, trying each known extension.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        let extensions = ["toml", "json"];

        for search_path in &self.search_paths {
            let path = search_path.join(name);
            if path.is_file() {
                return Some(path);
            }

            for ext in &extensions {
                let path = search_path.join(format!("{name}.{ext}"));
                if path.is_file() {
                    return Some(path);
                }
            }
        }

        None
    }

    /// Load a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, its format is unknown,
    /// or its contents are invalid.
    pub fn load(&self, path: &Path) -> Result<EngineConfig> {
        let content = RegexError::with_io_context(
            std::fs::read_to_string(path),
            format!("reading {}", path.display()),
        )?;

        let format = ConfigFormat::from_path(path)
            .or(self.default_format)
            .ok_or_else(|| {
                RegexError::config(format!("unknown config format: {}", path.display()))
            })?;

        let config = parse_config(&content, format)?;
        tracing::debug!(path = %path.display(), ?config, "loaded engine config");
        Ok(config)
    }

    /// Load by name (searches paths).
    ///
    /// # Errors
    ///
    /// Returns an error if no file is found or loading fails.
    pub fn load_by_name(&self, name: &str) -> Result<EngineConfig> {
        let path = self
            .find(name)
            .ok_or_else(|| RegexError::config(format!("config file not found: {name}")))?;
        self.load(&path)
    }
}

/// Parse and validate config content.
///
/// Missing keys keep their defaults; unknown keys are rejected.
///
/// # Errors
///
/// Returns a configuration error if the content does not deserialize or
/// fails validation.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<EngineConfig> {
    let config: EngineConfig = match format {
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| RegexError::config(e.to_string()))?
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| RegexError::config(e.to_string()))?
        }
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_toml() {
        let content = r"
            max_program_size = 4096
            max_match_steps = 100000
        ";

        let config = parse_config(content, ConfigFormat::Toml).unwrap();
        assert_eq!(config.max_program_size, 4096);
        assert_eq!(config.max_match_steps, Some(100_000));
        assert_eq!(
            config.max_nesting_depth,
            EngineConfig::default().max_nesting_depth
        );
    }

    #[test]
    fn parse_json() {
        let content = r#"{ "max_nesting_depth": 12 }"#;
        let config = parse_config(content, ConfigFormat::Json).unwrap();
        assert_eq!(config.max_nesting_depth, 12);
        assert_eq!(config.max_match_steps, None);
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = parse_config("max_cheese = 1", ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, RegexError::Config { .. }));
    }

    #[test]
    fn invalid_values_rejected() {
        let err = parse_config("max_program_size = 0", ConfigFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("max_program_size"));
    }

    #[test]
    fn config_format_detection() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("JSON"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
        assert_eq!(
            ConfigFormat::from_path(Path::new("/etc/regcore.toml")),
            Some(ConfigFormat::Toml)
        );
    }

    #[test]
    fn load_from_search_path() {
        let dir = std::env::temp_dir().join(format!("regcore-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("engine.toml"), "max_program_size = 777\n").unwrap();

        let loader = ConfigLoader::new().add_path(&dir);
        let config = loader.load_by_name("engine").unwrap();
        assert_eq!(config.max_program_size, 777);
        assert!(loader.load_by_name("missing").is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unknown_extension_uses_default_format() {
        let dir = std::env::temp_dir().join(format!("regcore-config-fmt-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("engine.conf");
        std::fs::write(&path, r#"{ "max_program_size": 99 }"#).unwrap();

        assert!(ConfigLoader::new().load(&path).is_err());
        let config = ConfigLoader::new()
            .with_format(ConfigFormat::Json)
            .load(&path)
            .unwrap();
        assert_eq!(config.max_program_size, 99);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
