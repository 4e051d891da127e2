//! The front-end settings record.
//!
//! Stored on disk as a flat JSON object:
//!
//! ```json
//! { "username": "me", "target_accounts": "acct_one\nacct_two", "follow_count": 50 }
//! ```
//!
//! Fields annotated with `#[serde(default = "...")]` fall back to their
//! default when absent, so a partial or older file still loads.  The
//! password is deliberately not part of this record.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Users to follow per target account when nothing has been saved yet.
pub const DEFAULT_FOLLOW_COUNT: u32 = 50;

/// Accepted range for the per-account follow quota.
pub const FOLLOW_COUNT_RANGE: RangeInclusive<u32> = 1..=1000;

/// The persisted settings record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Account the bot logs in as.
    #[serde(default)]
    pub username: String,
    /// Newline-separated target accounts, exactly as the user typed them.
    #[serde(default)]
    pub target_accounts: String,
    /// Users to follow per target account.
    #[serde(default = "default_follow_count")]
    pub follow_count: u32,
}

fn default_follow_count() -> u32 {
    DEFAULT_FOLLOW_COUNT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            username: String::new(),
            target_accounts: String::new(),
            follow_count: default_follow_count(),
        }
    }
}

impl Settings {
    /// Returns the non-blank target account lines, trimmed, in input order.
    pub fn target_list(&self) -> Vec<String> {
        parse_target_lines(&self.target_accounts)
    }

    /// Clamps `follow_count` into [`FOLLOW_COUNT_RANGE`].
    ///
    /// Applied after loading so a hand-edited file cannot push the quota
    /// outside what the front end accepts.
    pub fn normalized(mut self) -> Self {
        self.follow_count = self
            .follow_count
            .clamp(*FOLLOW_COUNT_RANGE.start(), *FOLLOW_COUNT_RANGE.end());
        self
    }
}

/// Splits newline-separated account text into trimmed, non-blank entries.
pub fn parse_target_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
