//! Follow batch export.
//!
//! File format:
//!
//! ```text
//! Username,Followed At,Batch Size
//! alice,2026-10-18T09:30:00.000000+02:00,2
//! bob,2026-10-18T09:30:00.000000+02:00,2
//! ```

use std::io::Write;

use chrono::{DateTime, Local};

use super::RosterError;

/// Header row of every exported batch.
pub const EXPORT_HEADER: [&str; 3] = ["Username", "Followed At", "Batch Size"];

/// Writes one follow batch to `writer`: the header row, then one row per
/// account stamped with `followed_at` and the batch size.
///
/// # Errors
///
/// Returns [`RosterError`] if a row cannot be written or the handle cannot
/// be flushed.
pub fn write_batch<W: Write>(
    writer: W,
    accounts: &[String],
    followed_at: &str,
) -> Result<(), RosterError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXPORT_HEADER)?;

    let batch_size = accounts.len().to_string();
    for account in accounts {
        csv_writer.write_record([account.as_str(), followed_at, batch_size.as_str()])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// File name for a batch exported at `at`.
///
/// `attempt` 1 yields `followed_users_batch_<YYYYMMDD_HHMMSS>.csv`; later
/// attempts append `_<attempt>` so two batches finished within the same
/// second get distinct names.
pub fn batch_file_name(at: DateTime<Local>, attempt: u32) -> String {
    let stamp = at.format("%Y%m%d_%H%M%S");
    if attempt <= 1 {
        format!("followed_users_batch_{stamp}.csv")
    } else {
        format!("followed_users_batch_{stamp}_{attempt}.csv")
    }
}
