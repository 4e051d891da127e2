//! Append-only action log.
//!
//! One JSON array of [`ActionLogEntry`] in a single file, pretty-printed
//! with two-space indentation.  Every append reads the whole array, pushes
//! one entry, and replaces the file by writing a sibling temp file and
//! renaming it over the original, so a crash mid-write leaves the previous
//! log intact.
//!
//! Appending is best effort: a failure is logged and the entry is lost.
//! Nothing about a run depends on its log entry being written.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use igauto_core::{ActionKind, ActionLogEntry};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ActionLogError {
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid action log JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The action log file at a fixed path.
#[derive(Debug, Clone)]
pub struct ActionLog {
    path: PathBuf,
}

impl ActionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records one completed run.  `timestamp` defaults to the local clock.
    ///
    /// Returns the entry written, or `None` if the log could not be updated.
    pub fn append(
        &self,
        kind: ActionKind,
        accounts: Vec<String>,
        timestamp: Option<String>,
    ) -> Option<ActionLogEntry> {
        let entry = ActionLogEntry::new(kind, accounts, timestamp);
        match self.try_append(entry.clone()) {
            Ok(()) => {
                debug!(%kind, accounts = entry.accounts.len(), "action logged");
                Some(entry)
            }
            Err(e) => {
                warn!(path = %self.path.display(), %kind, "Error saving log: {e}");
                None
            }
        }
    }

    /// Appends `entry`, reporting any failure.
    ///
    /// # Errors
    ///
    /// Returns [`ActionLogError::Json`] if the existing file is not an entry
    /// array (the file is left untouched) and [`ActionLogError::Io`] if it
    /// cannot be read or replaced.
    pub fn try_append(&self, entry: ActionLogEntry) -> Result<(), ActionLogError> {
        let mut entries = self.entries()?;
        entries.push(entry);
        self.replace(&entries)
    }

    /// All entries, oldest first.  A missing file is an empty log.
    ///
    /// # Errors
    ///
    /// Returns [`ActionLogError`] if the file exists but cannot be read or
    /// parsed.
    pub fn entries(&self) -> Result<Vec<ActionLogEntry>, ActionLogError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(ActionLogError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// The history view text: every entry rendered in file order.
    pub fn render_history(&self) -> String {
        if !self.path.exists() {
            return "No action history found.".to_string();
        }
        match self.entries() {
            Ok(entries) => entries.iter().map(ActionLogEntry::render).collect(),
            Err(e) => format!("Error loading log: {e}"),
        }
    }

    fn replace(&self, entries: &[ActionLogEntry]) -> Result<(), ActionLogError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| ActionLogError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, content).map_err(|source| ActionLogError::Io {
            path: tmp.clone(),
            source,
        })?;
        if let Err(source) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(ActionLogError::Io {
                path: self.path.clone(),
                source,
            });
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
