//! Writes each finished follow batch to its own CSV file.
//!
//! Files are created with `create_new`, so an existing export is never
//! overwritten or appended to.  Two batches stamped with the same second get
//! `_2`, `_3`, ... suffixes.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use igauto_core::{batch_file_name, iso_timestamp, write_batch, RosterError};
use thiserror::Error;
use tracing::info;

/// Names tried per second before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] RosterError),

    #[error("no free export file name in {0}")]
    NoFreeName(PathBuf),
}

/// Exports batches into one directory.
#[derive(Debug, Clone)]
pub struct BatchExporter {
    dir: PathBuf,
}

impl BatchExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Exports `accounts` stamped with the current local time.
    ///
    /// # Errors
    ///
    /// See [`BatchExporter::export_at`].
    pub fn export(&self, accounts: &[String]) -> Result<PathBuf, ExportError> {
        self.export_at(accounts, Local::now())
    }

    /// Writes `accounts` to a new file named after `at` and returns its path.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the file cannot be created,
    /// [`ExportError::Csv`] if writing fails, and
    /// [`ExportError::NoFreeName`] if every candidate name is taken.
    pub fn export_at(&self, accounts: &[String], at: DateTime<Local>) -> Result<PathBuf, ExportError> {
        let (path, file) = self.create_unique(at)?;
        write_batch(BufWriter::new(file), accounts, &iso_timestamp(at))?;
        info!(path = %path.display(), accounts = accounts.len(), "batch exported");
        Ok(path)
    }

    fn create_unique(&self, at: DateTime<Local>) -> Result<(PathBuf, File), ExportError> {
        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let path = self.dir.join(batch_file_name(at, attempt));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(ExportError::Io { path, source }),
            }
        }
        Err(ExportError::NoFreeName(self.dir.clone()))
    }
}
