//! TOML application config.
//!
//! Read from `--config <path>` or the platform config file:
//! - Windows:  `%APPDATA%\igauto\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/igauto/config.toml` or `~/.config/igauto/config.toml`
//! - macOS:    `~/Library/Application Support/igauto/config.toml`
//!
//! ```toml
//! [app]
//! log_level = "info"
//!
//! [paths]
//! settings_file = "settings.json"
//! data_dir = "."
//!
//! [bot]
//! program = "/usr/local/bin/ig-bot"
//! args = ["--headless"]
//! ```
//!
//! Every field has a serde default, so a missing file, a missing section, or
//! a missing key all load.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Error type for config file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppSection {
    /// `tracing` level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Where the front end keeps its files.  Relative paths resolve against the
/// working directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    #[serde(default = "default_settings_file")]
    pub settings_file: PathBuf,
    /// Parent of `logs/` and `csv_exports/`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// The external bot program.  Without a `program`, runs fail with
/// "bot program is not configured".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BotConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_settings_file() -> PathBuf {
    PathBuf::from("settings.json")
}
fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            settings_file: default_settings_file(),
            data_dir: default_data_dir(),
        }
    }
}

// ── Runtime paths ─────────────────────────────────────────────────────────────

/// The two locations every store is built from, after command-line
/// overrides have been applied to the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    pub settings_file: PathBuf,
    pub data_dir: PathBuf,
}

impl RuntimePaths {
    pub fn new(settings_file: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings_file: settings_file.into(),
            data_dir: data_dir.into(),
        }
    }

    /// Config paths, each replaced by its override when one is given.
    pub fn resolve(
        config: &PathsConfig,
        settings_file: Option<PathBuf>,
        data_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            settings_file: settings_file.unwrap_or_else(|| config.settings_file.clone()),
            data_dir: data_dir.unwrap_or_else(|| config.data_dir.clone()),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the platform config file path.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot
/// be determined from the environment.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the config from `path`, returning `AppConfig::default()` if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(AppConfig::default())
        }
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Loads the config from `explicit` if given, else from the platform file.
/// An undeterminable platform directory yields the defaults.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match explicit {
        Some(path) => load_config_from(path),
        None => match config_file_path() {
            Ok(path) => load_config_from(&path),
            Err(ConfigError::NoPlatformConfigDir) => Ok(AppConfig::default()),
            Err(e) => Err(e),
        },
    }
}

/// Resolves the platform config base directory, including the `igauto`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("igauto"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("igauto")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("igauto"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("igauto_cfg_test_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn test_app_config_default_values() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.app.log_level, "info");
        assert_eq!(cfg.paths.settings_file, PathBuf::from("settings.json"));
        assert_eq!(cfg.paths.data_dir, PathBuf::from("."));
        assert!(cfg.bot.program.is_none());
        assert!(cfg.bot.args.is_empty());
    }

    #[test]
    fn test_empty_toml_loads_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("parse");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_toml_fills_missing_keys() {
        // Arrange
        let text = r#"
            [paths]
            data_dir = "/var/lib/igauto"

            [bot]
            program = "ig-bot"
        "#;

        // Act
        let cfg: AppConfig = toml::from_str(text).expect("parse");

        // Assert
        assert_eq!(cfg.paths.data_dir, PathBuf::from("/var/lib/igauto"));
        assert_eq!(cfg.paths.settings_file, PathBuf::from("settings.json"));
        assert_eq!(cfg.bot.program.as_deref(), Some("ig-bot"));
        assert_eq!(cfg.app.log_level, "info");
    }

    #[test]
    fn test_load_config_from_missing_file_returns_defaults() {
        let path = temp_dir().join("absent.toml");
        let cfg = load_config_from(&path).expect("missing file is not an error");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_load_config_from_reads_file() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[app]\nlog_level = \"debug\"\n[bot]\nargs = [\"-v\"]\n").unwrap();

        // Act
        let cfg = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(cfg.app.log_level, "debug");
        assert_eq!(cfg.bot.args, vec!["-v"]);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_load_config_from_malformed_file_is_parse_error() {
        let dir = temp_dir();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[app\nlog_level = ").unwrap();

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_runtime_paths_prefer_overrides() {
        let cfg = PathsConfig::default();

        let paths = RuntimePaths::resolve(&cfg, None, Some(PathBuf::from("/data")));

        assert_eq!(paths.settings_file, PathBuf::from("settings.json"));
        assert_eq!(paths.data_dir, PathBuf::from("/data"));
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with("igauto/config.toml") || path.ends_with("igauto\\config.toml"));
        }
    }
}
