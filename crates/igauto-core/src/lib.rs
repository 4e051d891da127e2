//! # igauto-core
//!
//! Shared library for igauto containing the username rules, the persisted
//! record types, and the CSV roster formats.
//!
//! This crate is used by the application crate and its tests.  It has no
//! dependencies on the file system, threads, or the external bot; everything
//! here works on in-memory values or on caller-supplied `Read`/`Write`
//! handles.
//!
//! # Architecture overview
//!
//! igauto drives an external automation bot that follows and unfollows
//! accounts.  The application crate owns the front end and the background
//! worker; this crate defines what the front end persists and exchanges:
//!
//! - **`domain`** – Pure rules and records: the username validator, the
//!   settings record, and the action log entry.
//!
//! - **`roster`** – CSV formats.  Importing a list of accounts to unfollow
//!   and exporting a finished follow batch.

pub mod domain;
pub mod roster;

// Re-export the most-used types at the crate root so callers can write
// `igauto_core::Settings` instead of `igauto_core::domain::settings::Settings`.
pub use domain::action::{iso_timestamp, ActionKind, ActionLogEntry};
pub use domain::settings::{
    parse_target_lines, Settings, DEFAULT_FOLLOW_COUNT, FOLLOW_COUNT_RANGE,
};
pub use domain::username::{is_valid_username, validate_username, UsernameError, MAX_USERNAME_LEN};
pub use roster::export::{batch_file_name, write_batch, EXPORT_HEADER};
pub use roster::import::{parse_unfollow_roster, ImportReport, HEADER_ALIASES};
pub use roster::RosterError;
