//! Background run dispatcher.
//!
//! A bot operation blocks for as long as the network work takes, so it runs
//! on its own thread.  The thread reports to the front end through a single
//! channel:
//!
//! ```text
//! worker thread                         front end
//! ─────────────                         ─────────
//! bot.run_follow(&mut sink)
//!   sink.message("...")        ──►  RunEvent::Progress   (0..n, in order)
//!   sink.message("...")        ──►  RunEvent::Progress
//! returns / fails / panics     ──►  RunEvent::Finished   (exactly 1)
//! ```
//!
//! `Finished` is sent on every path, including bot errors and panics, so the
//! front end can always re-enable its controls.  There is no cancellation
//! and no timeout: a run ends when the bot returns.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use igauto_core::ActionKind;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::bot::{AutomationBot, BotError, ProgressSink, RunId};

/// Messages from a run to the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// One progress line, in the order the bot produced it.
    Progress {
        run_id: RunId,
        kind: ActionKind,
        message: String,
    },
    /// The run is over.  Sent exactly once per run, always last.
    Finished {
        run_id: RunId,
        kind: ActionKind,
        /// Accounts processed: the bot's result on success, or whatever it
        /// reported before failing.
        accounts: Vec<String>,
        /// Error text when the run failed.
        failure: Option<String>,
    },
}

impl RunEvent {
    pub fn run_id(&self) -> RunId {
        match self {
            RunEvent::Progress { run_id, .. } | RunEvent::Finished { run_id, .. } => *run_id,
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            RunEvent::Progress { kind, .. } | RunEvent::Finished { kind, .. } => *kind,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, RunEvent::Finished { .. })
    }
}

/// Error starting a run.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Handle to a dispatched run.
#[derive(Debug)]
pub struct RunHandle {
    pub run_id: RunId,
    pub kind: ActionKind,
    join: JoinHandle<()>,
}

impl RunHandle {
    /// Blocks until the worker thread has exited.  The `Finished` event has
    /// been sent by then.
    pub fn join(self) {
        if self.join.join().is_err() {
            warn!(run_id = %self.run_id, "worker thread ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Runs `kind` on `bot` in a new background thread, reporting to `events`.
///
/// # Errors
///
/// Returns [`DispatchError::Spawn`] if the OS refuses to create the thread.
/// No events are sent in that case.
pub fn dispatch_run(
    bot: Box<dyn AutomationBot>,
    kind: ActionKind,
    events: UnboundedSender<RunEvent>,
) -> Result<RunHandle, DispatchError> {
    let run_id = Uuid::new_v4();

    let join = thread::Builder::new()
        .name(format!("igauto-{kind}"))
        .spawn(move || run_worker(bot, run_id, kind, events))?;

    info!(%run_id, %kind, "run dispatched");
    Ok(RunHandle { run_id, kind, join })
}

/// Body of the worker thread.
fn run_worker(
    mut bot: Box<dyn AutomationBot>,
    run_id: RunId,
    kind: ActionKind,
    events: UnboundedSender<RunEvent>,
) {
    let mut sink = ProgressSink::new(run_id, kind, events.clone());

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| match kind {
        ActionKind::Follow => bot.run_follow(&mut sink),
        ActionKind::Unfollow => bot.run_unfollow(&mut sink),
    }))
    .unwrap_or_else(|payload| Err(BotError::Panicked(panic_message(payload.as_ref()))));

    let (accounts, failure) = match outcome {
        Ok(accounts) => {
            info!(%run_id, %kind, processed = accounts.len(), "run completed");
            (accounts, None)
        }
        Err(err) => {
            warn!(%run_id, %kind, "run failed: {err}");
            sink.message(format!("Error: {err}"));
            (sink.into_processed(), Some(err.to_string()))
        }
    };

    let finished = RunEvent::Finished {
        run_id,
        kind,
        accounts,
        failure,
    };
    if events.send(finished).is_err() {
        warn!(%run_id, "front end closed before run finished");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::infrastructure::bot::mock::{ScriptStep, ScriptedBot};

    fn collect(mut rx: mpsc::UnboundedReceiver<RunEvent>) -> Vec<RunEvent> {
        let mut out = Vec::new();
        while let Some(event) = rx.blocking_recv() {
            out.push(event);
        }
        out
    }

    fn run_to_end(bot: ScriptedBot, kind: ActionKind) -> Vec<RunEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = dispatch_run(Box::new(bot), kind, tx).expect("dispatch");
        handle.join();
        collect(rx)
    }

    #[test]
    fn test_successful_run_sends_progress_then_one_finished() {
        // Arrange
        let bot = ScriptedBot::new(vec![
            ScriptStep::Log("logging in".into()),
            ScriptStep::Process("alice".into()),
            ScriptStep::Process("bob".into()),
        ]);

        // Act
        let events = run_to_end(bot, ActionKind::Follow);

        // Assert
        let progress: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Progress { message, .. } => Some(message.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec!["logging in"]);
        assert_eq!(events.iter().filter(|e| e.is_finished()).count(), 1);
        assert!(events.last().unwrap().is_finished());
        match events.last().unwrap() {
            RunEvent::Finished { accounts, failure, kind, .. } => {
                assert_eq!(accounts, &vec!["alice".to_string(), "bob".to_string()]);
                assert!(failure.is_none());
                assert_eq!(*kind, ActionKind::Follow);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_failed_run_delivers_partial_accounts_and_error_line() {
        // Arrange
        let bot = ScriptedBot::new(vec![
            ScriptStep::Process("carol".into()),
            ScriptStep::Fail("rate limited".into()),
            ScriptStep::Process("never".into()),
        ]);

        // Act
        let events = run_to_end(bot, ActionKind::Unfollow);

        // Assert
        let RunEvent::Finished { accounts, failure, .. } = events.last().unwrap() else {
            panic!("last event must be Finished");
        };
        assert_eq!(accounts, &vec!["carol".to_string()]);
        assert!(failure.as_deref().unwrap().contains("rate limited"));
        assert!(events.iter().any(|e| matches!(
            e,
            RunEvent::Progress { message, .. } if message.starts_with("Error: ")
        )));
    }

    #[test]
    fn test_failure_before_any_account_delivers_empty_list() {
        let bot = ScriptedBot::new(vec![ScriptStep::Fail("bad password".into())]);

        let events = run_to_end(bot, ActionKind::Follow);

        let RunEvent::Finished { accounts, failure, .. } = events.last().unwrap() else {
            panic!("last event must be Finished");
        };
        assert!(accounts.is_empty());
        assert!(failure.is_some());
    }

    #[test]
    fn test_panicking_bot_still_finishes() {
        let bot = ScriptedBot::new(vec![
            ScriptStep::Process("dave".into()),
            ScriptStep::Panic("boom".into()),
        ]);

        let events = run_to_end(bot, ActionKind::Follow);

        let RunEvent::Finished { accounts, failure, .. } = events.last().unwrap() else {
            panic!("last event must be Finished");
        };
        assert_eq!(accounts, &vec!["dave".to_string()]);
        assert!(failure.as_deref().unwrap().contains("boom"));
    }

    #[test]
    fn test_all_events_carry_the_handle_run_id() {
        let (tx, rx) = mpsc::unbounded_channel();
        let bot = ScriptedBot::new(vec![ScriptStep::Log("x".into()), ScriptStep::Log("y".into())]);

        let handle = dispatch_run(Box::new(bot), ActionKind::Unfollow, tx).expect("dispatch");
        let run_id = handle.run_id;
        handle.join();

        let events = collect(rx);
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.run_id() == run_id));
        assert!(events.iter().all(|e| e.kind() == ActionKind::Unfollow));
    }

    #[test]
    fn test_panic_message_extracts_str_and_string_payloads() {
        let a: Box<dyn Any + Send> = Box::new("static");
        let b: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let c: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(a.as_ref()), "static");
        assert_eq!(panic_message(b.as_ref()), "owned");
        assert_eq!(panic_message(c.as_ref()), "unknown panic payload");
    }
}
