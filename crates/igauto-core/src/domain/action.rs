//! Action kinds and action log entries.
//!
//! The action log is a JSON array of entries:
//!
//! ```json
//! [
//!   { "timestamp": "2026-10-18T09:30:00.123456+02:00", "action": "follow", "accounts": ["a", "b"] }
//! ]
//! ```
//!
//! Entries are never modified after they are written.

use std::fmt;

use chrono::{DateTime, Local, SecondsFormat};
use serde::{Deserialize, Serialize};

/// The two operations the bot can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Follow,
    Unfollow,
}

impl ActionKind {
    /// Lowercase name used in the log file and on the bot command line.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Follow => "follow",
            ActionKind::Unfollow => "unfollow",
        }
    }

    /// Name with a leading capital, for completion messages.
    pub fn title(self) -> &'static str {
        match self {
            ActionKind::Follow => "Follow",
            ActionKind::Unfollow => "Unfollow",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed run as recorded in the action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    /// ISO-8601 timestamp of when the run was recorded.
    pub timestamp: String,
    /// Which operation ran.
    pub action: ActionKind,
    /// Accounts the bot reported as processed.
    pub accounts: Vec<String>,
}

impl ActionLogEntry {
    /// Builds an entry, stamping it with the local clock when `timestamp`
    /// is `None`.
    pub fn new(action: ActionKind, accounts: Vec<String>, timestamp: Option<String>) -> Self {
        Self {
            timestamp: timestamp.unwrap_or_else(|| iso_timestamp(Local::now())),
            action,
            accounts,
        }
    }

    /// Renders this entry the way the history view shows it.
    pub fn render(&self) -> String {
        let mut out = format!(
            "=== {} - {} ===\nAccounts:\n",
            self.action.as_str().to_uppercase(),
            self.timestamp
        );
        for account in &self.accounts {
            out.push_str("- ");
            out.push_str(account);
            out.push('\n');
        }
        out.push('\n');
        out
    }
}

/// Formats `at` as ISO-8601 with microsecond precision.
pub fn iso_timestamp(at: DateTime<Local>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ActionKind::Follow).unwrap(), "\"follow\"");
        assert_eq!(serde_json::to_string(&ActionKind::Unfollow).unwrap(), "\"unfollow\"");
    }

    #[test]
    fn test_action_kind_display_and_title() {
        assert_eq!(ActionKind::Unfollow.to_string(), "unfollow");
        assert_eq!(ActionKind::Follow.title(), "Follow");
    }

    #[test]
    fn test_new_keeps_supplied_timestamp() {
        let entry = ActionLogEntry::new(
            ActionKind::Follow,
            vec!["a".into()],
            Some("2024-01-01T00:00:00".into()),
        );
        assert_eq!(entry.timestamp, "2024-01-01T00:00:00");
    }

    #[test]
    fn test_new_derives_parseable_timestamp_when_absent() {
        // Arrange / Act
        let entry = ActionLogEntry::new(ActionKind::Unfollow, Vec::new(), None);

        // Assert
        assert!(
            DateTime::parse_from_rfc3339(&entry.timestamp).is_ok(),
            "derived timestamp must be ISO-8601: {}",
            entry.timestamp
        );
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = ActionLogEntry::new(
            ActionKind::Follow,
            vec!["a".into(), "b".into()],
            Some("t".into()),
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["timestamp"], "t");
        assert_eq!(json["action"], "follow");
        assert_eq!(json["accounts"][1], "b");
    }

    #[test]
    fn test_render_lists_each_account() {
        let entry = ActionLogEntry::new(
            ActionKind::Follow,
            vec!["alpha".into(), "beta".into()],
            Some("2024-05-01T10:00:00".into()),
        );

        let text = entry.render();

        assert_eq!(
            text,
            "=== FOLLOW - 2024-05-01T10:00:00 ===\nAccounts:\n- alpha\n- beta\n\n"
        );
    }
}
