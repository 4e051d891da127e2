//! Contract for the external automation bot.
//!
//! The bot does the actual network work: logging in, finding accounts,
//! following and unfollowing.  igauto never talks to the network itself;
//! it builds a bot through a [`BotFactory`], runs one operation on a
//! background thread, and listens to what the bot reports through a
//! [`ProgressSink`].
//!
//! # Testability
//!
//! The front end only sees these traits, so tests inject a scripted bot
//! (see `infrastructure::bot::mock`) instead of a real one.

use std::fmt;

use igauto_core::ActionKind;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::application::run_dispatch::RunEvent;

/// Identifies one dispatched run; carried on every event the run produces.
pub type RunId = Uuid;

/// Everything the bot needs to be constructed for one run.
///
/// For a follow run `accounts` holds the target accounts whose followers are
/// followed, `users_per_account` at most per target.  For an unfollow run
/// `accounts` is the imported unfollow list and `users_per_account` is 0.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct BotRequest {
    pub username: String,
    pub password: String,
    pub accounts: Vec<String>,
    pub users_per_account: u32,
}

impl fmt::Debug for BotRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("accounts", &self.accounts)
            .field("users_per_account", &self.users_per_account)
            .finish()
    }
}

/// Failures reported by a bot or while creating one.
#[derive(Debug, Error)]
pub enum BotError {
    /// Login was refused.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// A network call failed.
    #[error("network error: {0}")]
    Network(String),

    /// The bot program could not be started.
    #[error("failed to start bot program `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the bot failed.
    #[error("bot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bot program exited unsuccessfully.
    #[error("bot exited with {status}: {stderr}")]
    Exited { status: String, stderr: String },

    /// The bot panicked on the worker thread.
    #[error("bot panicked: {0}")]
    Panicked(String),

    /// No bot program has been configured.
    #[error("no bot program configured; set [bot] program in the config file")]
    NotConfigured,
}

/// One instance of the external bot, used for a single run.
pub trait AutomationBot: Send {
    /// Follows accounts from the configured targets and returns the accounts
    /// actually followed.
    fn run_follow(&mut self, sink: &mut ProgressSink) -> Result<Vec<String>, BotError>;

    /// Unfollows the configured accounts and returns the accounts actually
    /// unfollowed.
    fn run_unfollow(&mut self, sink: &mut ProgressSink) -> Result<Vec<String>, BotError>;
}

/// Builds a bot for a run.
#[cfg_attr(test, mockall::automock)]
pub trait BotFactory: Send + Sync {
    /// Creates a bot configured by `request`.
    fn create(&self, request: &BotRequest) -> Result<Box<dyn AutomationBot>, BotError>;
}

/// Where a running bot reports progress.
///
/// Messages are forwarded to the front end immediately and in order.
/// Accounts reported through [`ProgressSink::processed`] are also remembered,
/// so a run that fails halfway still delivers what it got done.
pub struct ProgressSink {
    run_id: RunId,
    kind: ActionKind,
    events: UnboundedSender<RunEvent>,
    processed: Vec<String>,
}

impl ProgressSink {
    /// Creates a sink that forwards to `events`, tagging each event with
    /// `run_id` and `kind`.
    pub fn new(run_id: RunId, kind: ActionKind, events: UnboundedSender<RunEvent>) -> Self {
        Self {
            run_id,
            kind,
            events,
            processed: Vec::new(),
        }
    }

    /// Forwards one progress line.
    pub fn message(&self, message: impl Into<String>) {
        // A closed channel means the front end is gone; the run still
        // finishes so the bot can clean up.
        let _ = self.events.send(RunEvent::Progress {
            run_id: self.run_id,
            kind: self.kind,
            message: message.into(),
        });
    }

    /// Records that `account` has been processed.
    pub fn processed(&mut self, account: impl Into<String>) {
        self.processed.push(account.into());
    }

    /// Accounts recorded so far.
    pub fn processed_accounts(&self) -> &[String] {
        &self.processed
    }

    pub(crate) fn into_processed(self) -> Vec<String> {
        self.processed
    }
}
