//! JSON persistence for the [`Settings`] record.
//!
//! The file holds one flat object and is overwritten wholesale on every
//! save.  Loading never fails from the caller's point of view: a missing,
//! unreadable, or malformed file yields the defaults, and a field that is
//! absent or of the wrong type takes its own default without disturbing the
//! others.

use std::path::{Path, PathBuf};

use igauto_core::{Settings, DEFAULT_FOLLOW_COUNT, FOLLOW_COUNT_RANGE};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads and writes the settings file at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the settings, falling back to [`Settings::default`] on any
    /// error.  Absent fields take their individual defaults.
    pub fn load(&self) -> Settings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(SettingsError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                debug!(path = %self.path.display(), "no settings file, using defaults");
                Settings::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), "ignoring settings file: {e}");
                Settings::default()
            }
        }
    }

    /// Loads the settings, reporting why the file could not be used.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] if the file cannot be read and
    /// [`SettingsError::Json`] if it is not a JSON object.
    pub fn try_load(&self) -> Result<Settings, SettingsError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })?;
        let fields: Map<String, Value> = serde_json::from_str(&content)?;
        Ok(settings_from_fields(&fields))
    }

    /// Overwrites the file with `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] if the file (or its parent directory)
    /// cannot be written.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| SettingsError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, content).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

/// Builds the record one field at a time.
fn settings_from_fields(fields: &Map<String, Value>) -> Settings {
    let text = |key: &str| match fields.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            warn!(field = key, value = %other, "settings field is not a string, using default");
            String::new()
        }
        None => String::new(),
    };

    Settings {
        username: text("username"),
        target_accounts: text("target_accounts"),
        follow_count: follow_count_field(fields.get("follow_count")),
    }
    .normalized()
}

/// Integers are clamped into range; anything else takes the default.
fn follow_count_field(value: Option<&Value>) -> u32 {
    let (min, max) = (*FOLLOW_COUNT_RANGE.start(), *FOLLOW_COUNT_RANGE.end());
    match value {
        None => DEFAULT_FOLLOW_COUNT,
        Some(v) if v.is_i64() => v
            .as_i64()
            .map(|n| n.clamp(i64::from(min), i64::from(max)))
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(DEFAULT_FOLLOW_COUNT),
        Some(v) if v.is_u64() => max,
        Some(other) => {
            warn!(value = %other, "follow_count is not an integer, using default");
            DEFAULT_FOLLOW_COUNT
        }
    }
}
