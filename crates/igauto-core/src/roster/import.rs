//! Unfollow roster import.
//!
//! Rules applied to each row, in order:
//!
//! 1. Rows with no fields are ignored.
//! 2. The first column is trimmed and becomes the candidate username.
//! 3. A candidate that case-insensitively matches one of [`HEADER_ALIASES`]
//!    is treated as a header and skipped.
//! 4. The candidate is validated; rejected values go to the invalid list.
//! 5. Accepted values already seen (compared case-insensitively) go to the
//!    duplicates list; the first occurrence is kept.

use std::collections::HashSet;
use std::io::Read;

use tracing::debug;

use super::RosterError;
use crate::domain::username::is_valid_username;

/// First-column values that mark a header row.
pub const HEADER_ALIASES: &[&str] = &["username", "user", "account", "name", "handle"];

/// How many invalid names are shown to the user.
const INVALID_PREVIEW_LEN: usize = 5;

/// Result of parsing an unfollow roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Accepted usernames in file order, without duplicates.
    pub usernames: Vec<String>,
    /// Rejected first-column values in file order.
    pub invalid: Vec<String>,
    /// Accepted values dropped because an equal name came earlier.
    pub duplicates: Vec<String>,
    /// Number of rows skipped as headers.
    pub headers_skipped: usize,
}

impl ImportReport {
    /// The first few rejected values, for display.
    pub fn invalid_preview(&self) -> &[String] {
        let end = self.invalid.len().min(INVALID_PREVIEW_LEN);
        &self.invalid[..end]
    }
}

/// Parses an unfollow roster from `reader`.
///
/// # Errors
///
/// Returns [`RosterError::Csv`] when a row cannot be decoded; in that case
/// nothing from the file should be used.
///
/// # Examples
///
/// ```rust
/// use igauto_core::parse_unfollow_roster;
///
/// let report = parse_unfollow_roster("Username\njohn_doe\n12345\n".as_bytes()).unwrap();
/// assert_eq!(report.usernames, vec!["john_doe".to_string()]);
/// assert_eq!(report.invalid, vec!["12345".to_string()]);
/// ```
pub fn parse_unfollow_roster<R: Read>(reader: R) -> Result<ImportReport, RosterError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut report = ImportReport::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let Some(first) = record.get(0) else {
            continue;
        };

        let candidate = if index == 0 {
            first.trim_start_matches('\u{feff}').trim()
        } else {
            first.trim()
        };

        if is_header_alias(candidate) {
            debug!("skipping header row {index}: {candidate:?}");
            report.headers_skipped += 1;
            continue;
        }

        if !is_valid_username(candidate) {
            report.invalid.push(candidate.to_string());
            continue;
        }

        if seen.insert(candidate.to_ascii_lowercase()) {
            report.usernames.push(candidate.to_string());
        } else {
            report.duplicates.push(candidate.to_string());
        }
    }

    Ok(report)
}

fn is_header_alias(candidate: &str) -> bool {
    HEADER_ALIASES
        .iter()
        .any(|alias| candidate.eq_ignore_ascii_case(alias))
}
