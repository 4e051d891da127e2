//! CSV roster formats.
//!
//! A *roster* is a list of account identifiers exchanged with the user as a
//! CSV file:
//!
//! - **`import`** – reads a user-supplied file whose first column holds the
//!   accounts to unfollow.  A header row is detected and skipped.
//! - **`export`** – writes one finished follow batch as
//!   `Username,Followed At,Batch Size` rows.
//!
//! Both sides work on generic `Read`/`Write` handles; opening and naming
//! files is the application crate's job.

use thiserror::Error;

pub mod export;
pub mod import;

/// Errors produced while reading or writing a roster.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The CSV reader or writer failed (malformed quoting, invalid UTF-8, ...).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The underlying handle failed while flushing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
