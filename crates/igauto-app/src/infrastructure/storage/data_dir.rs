//! On-disk layout of the data directory.
//!
//! ```text
//! <root>/
//!   logs/action_log.json
//!   csv_exports/followed_users_batch_<YYYYMMDD_HHMMSS>.csv
//! ```

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

pub const LOGS_DIR: &str = "logs";
pub const EXPORTS_DIR: &str = "csv_exports";
pub const ACTION_LOG_FILE: &str = "action_log.json";

/// A data directory whose subdirectories exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Creates `root`, `root/logs` and `root/csv_exports` if missing.
    ///
    /// # Errors
    ///
    /// Returns the I/O error of the first directory that cannot be created.
    pub fn setup(root: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = Self { root: root.into() };
        std::fs::create_dir_all(dir.logs_dir())?;
        std::fs::create_dir_all(dir.exports_dir())?;
        debug!(root = %dir.root.display(), "data directory ready");
        Ok(dir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.root.join(EXPORTS_DIR)
    }

    pub fn action_log_path(&self) -> PathBuf {
        self.logs_dir().join(ACTION_LOG_FILE)
    }
}
