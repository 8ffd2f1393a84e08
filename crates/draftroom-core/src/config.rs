// Configuration loading (config/draftroom.toml, seeded from defaults/).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::coordinator::OverviewLimits;

pub const CONFIG_FILE: &str = "draftroom.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// draftroom.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub overview: OverviewConfig,
    pub ticker: TickerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverviewConfig {
    pub recent_picks: u32,
    pub upcoming_slots: u32,
}

impl OverviewConfig {
    pub fn limits(&self) -> OverviewLimits {
        OverviewLimits {
            recent_picks: self.recent_picks,
            upcoming_slots: self.upcoming_slots,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TickerConfig {
    pub interval_secs: u64,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/draftroom.toml` relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = std::fs::read_to_string(&path)
        .map_err(|_| ConfigError::FileNotFound { path: path.clone() })?;
    let config: Config =
        toml::from_str(&text).map_err(|e| ConfigError::ParseError { path, source: e })?;

    validate(&config)?;

    Ok(config)
}

/// Seed `config/draftroom.toml` from `defaults/` if it does not exist yet.
///
/// Returns the path written, or `None` when a config was already in place.
/// An existing file is never overwritten.
pub fn seed_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.exists() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    let content = std::fs::read(&source).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!(
            "no config at {} and cannot read {}: {e}",
            target.display(),
            source.display()
        ),
    })?;

    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", dir.display()),
        })?;
    }
    std::fs::write(&target, content).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to write {}: {e}", target.display()),
    })?;

    Ok(Some(target))
}

/// Load config relative to the working directory, seeding it from defaults.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    if let Some(path) = seed_config_file(&cwd)? {
        info!("Seeded {} from defaults", path.display());
    }
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.database.path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    if config.ticker.interval_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "ticker.interval_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Workspace root, where `defaults/` lives.
    fn project_root() -> PathBuf {
        let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let root = manifest.join("../..");
        assert!(
            root.join("defaults").exists(),
            "Cannot locate defaults/ directory from {:?}",
            manifest
        );
        root
    }

    /// A scratch base dir holding `config/draftroom.toml` with `body`.
    fn base_with_config(body: &str) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("config")).unwrap();
        fs::write(tmp.path().join("config").join(CONFIG_FILE), body).unwrap();
        tmp
    }

    fn default_text() -> String {
        fs::read_to_string(project_root().join("defaults").join(CONFIG_FILE)).unwrap()
    }

    #[test]
    fn load_valid_config_from_defaults() {
        let tmp = base_with_config(&default_text());
        let config = load_config_from(tmp.path()).expect("defaults should be valid");

        assert_eq!(config.database.path, "draftroom.db");
        assert_eq!(config.overview.recent_picks, 10);
        assert_eq!(config.overview.upcoming_slots, 12);
        assert_eq!(config.ticker.interval_secs, 1);
        assert_eq!(
            config.overview.limits(),
            OverviewLimits {
                recent_picks: 10,
                upcoming_slots: 12
            }
        );
    }

    #[test]
    fn rejects_zero_ticker_interval() {
        let text = default_text().replace("interval_secs = 1", "interval_secs = 0");
        let tmp = base_with_config(&text);
        match load_config_from(tmp.path()).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "ticker.interval_secs"),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn rejects_blank_database_path() {
        let text = default_text().replace("path = \"draftroom.db\"", "path = \"  \"");
        let tmp = base_with_config(&text);
        match load_config_from(tmp.path()).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "database.path"),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn file_not_found_when_config_missing() {
        let tmp = tempfile::tempdir().unwrap();
        match load_config_from(tmp.path()).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with(CONFIG_FILE)),
            other => panic!("expected FileNotFound, got: {other}"),
        }
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = base_with_config("[database\npath = ");
        assert!(matches!(
            load_config_from(tmp.path()).unwrap_err(),
            ConfigError::ParseError { .. }
        ));
    }

    #[test]
    fn seed_copies_default_config() {
        let tmp = tempfile::tempdir().unwrap();
        let defaults_dir = tmp.path().join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::write(defaults_dir.join(CONFIG_FILE), default_text()).unwrap();

        let seeded = seed_config_file(tmp.path()).expect("should succeed");
        assert_eq!(seeded, Some(tmp.path().join("config").join(CONFIG_FILE)));

        load_config_from(tmp.path()).expect("seeded config should load");
        assert_eq!(seed_config_file(tmp.path()).unwrap(), None);
    }

    #[test]
    fn seed_keeps_existing_config() {
        let tmp = base_with_config("# custom\n");
        let defaults_dir = tmp.path().join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::write(defaults_dir.join(CONFIG_FILE), default_text()).unwrap();

        assert_eq!(seed_config_file(tmp.path()).unwrap(), None);
        let content = fs::read_to_string(tmp.path().join("config").join(CONFIG_FILE)).unwrap();
        assert_eq!(content, "# custom\n");
    }

    #[test]
    fn seed_errors_without_defaults_or_config() {
        let tmp = tempfile::tempdir().unwrap();
        match seed_config_file(tmp.path()).unwrap_err() {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("cannot read"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }
        assert!(!tmp.path().join("config").exists());
    }
}
