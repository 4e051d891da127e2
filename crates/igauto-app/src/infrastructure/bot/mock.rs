//! Scripted bot for tests and dry runs.
//!
//! Plays back a fixed list of [`ScriptStep`]s instead of talking to the
//! network, so the dispatcher and front end can be exercised end to end.

use std::sync::{Arc, Mutex, PoisonError};

use crate::application::bot::{AutomationBot, BotError, BotFactory, BotRequest, ProgressSink};

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Emit a progress line.
    Log(String),
    /// Report an account as processed.
    Process(String),
    /// Stop with a network error.
    Fail(String),
    /// Panic on the worker thread.
    Panic(String),
}

/// A mock implementation of [`AutomationBot`] that plays back a script.
///
/// On success it returns every account named by a `Process` step, in order.
pub struct ScriptedBot {
    script: Vec<ScriptStep>,
}

impl ScriptedBot {
    pub fn new(script: Vec<ScriptStep>) -> Self {
        Self { script }
    }

    fn play(&mut self, sink: &mut ProgressSink) -> Result<Vec<String>, BotError> {
        for step in &self.script {
            match step {
                ScriptStep::Log(message) => sink.message(message.clone()),
                ScriptStep::Process(account) => sink.processed(account.clone()),
                ScriptStep::Fail(reason) => return Err(BotError::Network(reason.clone())),
                ScriptStep::Panic(reason) => panic!("{reason}"),
            }
        }
        Ok(sink.processed_accounts().to_vec())
    }
}

impl AutomationBot for ScriptedBot {
    fn run_follow(&mut self, sink: &mut ProgressSink) -> Result<Vec<String>, BotError> {
        self.play(sink)
    }

    fn run_unfollow(&mut self, sink: &mut ProgressSink) -> Result<Vec<String>, BotError> {
        self.play(sink)
    }
}

/// Hands out [`ScriptedBot`]s and remembers every request it was given.
#[derive(Clone, Default)]
pub struct ScriptedBotFactory {
    script: Vec<ScriptStep>,
    create_error: Option<String>,
    requests: Arc<Mutex<Vec<BotRequest>>>,
}

impl ScriptedBotFactory {
    /// Every bot created plays `script`.
    pub fn new(script: Vec<ScriptStep>) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    /// A factory whose `create` always fails with an authentication error.
    pub fn refusing(reason: impl Into<String>) -> Self {
        Self {
            create_error: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<BotRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl BotFactory for ScriptedBotFactory {
    fn create(&self, request: &BotRequest) -> Result<Box<dyn AutomationBot>, BotError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        if let Some(reason) = &self.create_error {
            return Err(BotError::Authentication(reason.clone()));
        }
        Ok(Box::new(ScriptedBot::new(self.script.clone())))
    }
}
