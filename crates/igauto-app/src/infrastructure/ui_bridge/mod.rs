//! Command bridge: the operations a front end invokes, over shared
//! [`AppState`].
//!
//! Every command returns a [`CommandResult<T>`] so callers always get the
//! same shape: `{ success: bool, data: T | null, error: string | null }`.
//! Errors meant for the user (missing credentials, run already active, ...)
//! arrive as `error` text; nothing here panics or aborts the process.
//!
//! # Run lifecycle
//!
//! ```text
//! start_follow / start_unfollow
//!   validate ─► claim panel ─► (save settings) ─► BotFactory::create ─► dispatch_run
//!                                                                         │
//!            events channel ◄─────────── RunEvent::Progress* ◄────────────┤
//!                           ◄─────────── RunEvent::Finished  ◄────────────┘
//! handle_run_event(Progress)  → append to the tab's log
//! handle_run_event(Finished)  → release panel, export, log action, refresh history
//! ```
//!
//! The owner of the receiver returned by [`AppState::new`] must feed every
//! event to [`handle_run_event`].

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use igauto_core::{parse_unfollow_roster, ActionKind, ImportReport, Settings};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::application::bot::{BotFactory, BotRequest};
use crate::application::control_panel::{completion_summary, ControlPanel};
use crate::application::run_dispatch::{dispatch_run, RunEvent};
use crate::application::start_run::{follow_request, unfollow_request, Credentials, FollowForm};
use crate::infrastructure::storage::action_log::ActionLog;
use crate::infrastructure::storage::batch_export::BatchExporter;
use crate::infrastructure::storage::config::RuntimePaths;
use crate::infrastructure::storage::data_dir::DataDir;
use crate::infrastructure::storage::settings::SettingsStore;

// ── Shared application state ──────────────────────────────────────────────────

/// State shared by all commands.
///
/// The panel and settings sit behind async Tokio mutexes because commands
/// run on the Tokio runtime; the worker thread never sees them.
pub struct AppState {
    pub panel: Mutex<ControlPanel>,
    /// Settings as last loaded or saved.
    pub settings: Mutex<Settings>,
    settings_store: SettingsStore,
    action_log: ActionLog,
    exporter: BatchExporter,
    data_dir: DataDir,
    bot_factory: Arc<dyn BotFactory>,
    events: UnboundedSender<RunEvent>,
}

impl AppState {
    /// Prepares the data directory, loads settings and the history view,
    /// and opens the run event channel.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the data directory cannot be created.
    pub fn new(
        paths: &RuntimePaths,
        bot_factory: Arc<dyn BotFactory>,
    ) -> std::io::Result<(Arc<Self>, UnboundedReceiver<RunEvent>)> {
        let data_dir = DataDir::setup(&paths.data_dir)?;
        let settings_store = SettingsStore::new(&paths.settings_file);
        let settings = settings_store.load();
        let action_log = ActionLog::new(data_dir.action_log_path());
        let exporter = BatchExporter::new(data_dir.exports_dir());

        let mut panel = ControlPanel::new();
        panel.set_history(action_log.render_history());

        let (events, event_rx) = mpsc::unbounded_channel();
        info!(data_dir = %data_dir.root().display(), "front end state ready");

        let state = Arc::new(Self {
            panel: Mutex::new(panel),
            settings: Mutex::new(settings),
            settings_store,
            action_log,
            exporter,
            data_dir,
            bot_factory,
            events,
        });
        Ok((state, event_rx))
    }

    pub fn data_dir(&self) -> &DataDir {
        &self.data_dir
    }

    pub fn action_log(&self) -> &ActionLog {
        &self.action_log
    }
}

// ── DTOs ──────────────────────────────────────────────────────────────────────

/// Snapshot of everything the window shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PanelDto {
    pub follow_enabled: bool,
    pub unfollow_enabled: bool,
    pub file_label: String,
    pub file_label_is_error: bool,
    pub unfollow_count: usize,
    pub follow_log: Vec<String>,
    pub unfollow_log: Vec<String>,
    pub history: String,
    pub completion: Option<String>,
    /// `"follow"` or `"unfollow"` while a run is active.
    pub active_run: Option<String>,
}

impl From<&ControlPanel> for PanelDto {
    fn from(panel: &ControlPanel) -> Self {
        Self {
            follow_enabled: panel.follow_enabled(),
            unfollow_enabled: panel.unfollow_enabled(),
            file_label: panel.file_label().text(),
            file_label_is_error: panel.file_label().is_error(),
            unfollow_count: panel.unfollow_list().map_or(0, <[String]>::len),
            follow_log: panel.log_lines(ActionKind::Follow).to_vec(),
            unfollow_log: panel.log_lines(ActionKind::Unfollow).to_vec(),
            history: panel.history().to_string(),
            completion: panel.completion().map(str::to_string),
            active_run: panel.active_run().map(|r| r.kind.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunStartedDto {
    pub run_id: String,
    pub kind: String,
    /// Accounts handed to the bot (targets for follow, the list for unfollow).
    pub accounts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportDto {
    pub valid: usize,
    pub invalid: usize,
    pub duplicates: usize,
    pub file_label: String,
}

impl ImportDto {
    fn new(report: &ImportReport, file_label: String) -> Self {
        Self {
            valid: report.usernames.len(),
            invalid: report.invalid.len(),
            duplicates: report.duplicates.len(),
            file_label,
        }
    }
}

/// What one run event changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunUpdate {
    pub kind: ActionKind,
    /// Lines appended to the tab's log, in order.
    pub lines: Vec<String>,
    /// Completion notice, set only for `Finished`.
    pub completion: Option<String>,
}

/// Uniform command response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Returns the settings loaded at startup or last saved.
pub async fn get_settings(state: Arc<AppState>) -> CommandResult<Settings> {
    CommandResult::ok(state.settings.lock().await.clone())
}

/// Returns a snapshot of the panel.
pub async fn get_panel(state: Arc<AppState>) -> CommandResult<PanelDto> {
    let panel = state.panel.lock().await;
    CommandResult::ok(PanelDto::from(&*panel))
}

/// Re-reads the action log into the history view and returns its text.
pub async fn refresh_history(state: Arc<AppState>) -> CommandResult<String> {
    let history = state.action_log.render_history();
    state.panel.lock().await.set_history(history.clone());
    CommandResult::ok(history)
}

/// Validates the follow tab, saves its settings, and starts a follow run.
pub async fn start_follow(state: Arc<AppState>, form: FollowForm) -> CommandResult<RunStartedDto> {
    let request = match follow_request(&form) {
        Ok(r) => r,
        Err(e) => return CommandResult::err(e.to_string()),
    };

    let mut panel = state.panel.lock().await;
    if let Err(e) = panel.begin_run(ActionKind::Follow) {
        return CommandResult::err(e.to_string());
    }

    let settings = form.to_settings();
    if let Err(e) = state.settings_store.save(&settings) {
        warn!("failed to save settings: {e}");
    }
    *state.settings.lock().await = settings;

    start_run(&state, &mut panel, ActionKind::Follow, request)
}

/// Starts an unfollow run over the imported list.
pub async fn start_unfollow(
    state: Arc<AppState>,
    credentials: Credentials,
) -> CommandResult<RunStartedDto> {
    let mut panel = state.panel.lock().await;
    let request = match unfollow_request(&credentials, panel.unfollow_list()) {
        Ok(r) => r,
        Err(e) => return CommandResult::err(e.to_string()),
    };
    if let Err(e) = panel.begin_run(ActionKind::Unfollow) {
        return CommandResult::err(e.to_string());
    }

    start_run(&state, &mut panel, ActionKind::Unfollow, request)
}

/// Builds the bot and dispatches it.  The panel has already been claimed
/// and is released again on failure.
fn start_run(
    state: &AppState,
    panel: &mut ControlPanel,
    kind: ActionKind,
    request: BotRequest,
) -> CommandResult<RunStartedDto> {
    let accounts = request.accounts.len();

    let bot = match state.bot_factory.create(&request) {
        Ok(bot) => bot,
        Err(e) => {
            warn!(%kind, "bot could not be created: {e}");
            panel.abort_run();
            panel.log(kind, format!("Error: {e}"));
            return CommandResult::err(e.to_string());
        }
    };

    match dispatch_run(bot, kind, state.events.clone()) {
        Ok(handle) => {
            panel.attach_run(handle.run_id);
            CommandResult::ok(RunStartedDto {
                run_id: handle.run_id.to_string(),
                kind: kind.to_string(),
                accounts,
            })
        }
        Err(e) => {
            warn!(%kind, "run could not be dispatched: {e}");
            panel.abort_run();
            CommandResult::err(e.to_string())
        }
    }
}

/// Imports an unfollow list.  `None` means the file dialog was cancelled.
pub async fn import_csv(state: Arc<AppState>, path: Option<PathBuf>) -> CommandResult<ImportDto> {
    let mut panel = state.panel.lock().await;

    let Some(path) = path else {
        panel.import_cancelled();
        return CommandResult::err(panel.file_label().text());
    };

    let parsed = File::open(&path)
        .map_err(|e| e.to_string())
        .and_then(|file| parse_unfollow_roster(BufReader::new(file)).map_err(|e| e.to_string()));

    match parsed {
        Ok(report) => {
            info!(
                path = %path.display(),
                valid = report.usernames.len(),
                invalid = report.invalid.len(),
                "unfollow list imported"
            );
            let counts = ImportDto::new(&report, String::new());
            panel.import_succeeded(&path, report);
            CommandResult::ok(ImportDto {
                file_label: panel.file_label().text(),
                ..counts
            })
        }
        Err(e) => {
            warn!(path = %path.display(), "import failed: {e}");
            panel.import_failed(&e);
            CommandResult::err(format!("Error importing CSV: {e}"))
        }
    }
}

/// Applies one event from a run to the panel.
///
/// `Finished` also re-enables the controls, exports a non-empty follow
/// batch, appends the action log entry, and refreshes the history view.
pub async fn handle_run_event(state: &AppState, event: RunEvent) -> RunUpdate {
    let mut panel = state.panel.lock().await;
    let kind = event.kind();
    let before = panel.log_lines(kind).len();

    let completion = match event {
        RunEvent::Progress { message, .. } => {
            panel.log(kind, message);
            None
        }
        RunEvent::Finished {
            run_id, accounts, ..
        } => {
            panel.end_run(run_id);
            Some(finish_run(state, &mut panel, kind, accounts))
        }
    };

    RunUpdate {
        kind,
        lines: panel.log_lines(kind)[before..].to_vec(),
        completion,
    }
}

fn finish_run(
    state: &AppState,
    panel: &mut ControlPanel,
    kind: ActionKind,
    accounts: Vec<String>,
) -> String {
    let processed = accounts.len();

    if processed > 0 {
        match kind {
            ActionKind::Follow => {
                panel.log(
                    kind,
                    format!("Batch completed! Successfully processed {processed} accounts"),
                );
                match state.exporter.export(&accounts) {
                    Ok(path) => {
                        let name = path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        panel.log(kind, format!("Auto-exported {processed} accounts to: {name}"));
                    }
                    Err(e) => {
                        warn!("batch export failed: {e}");
                        panel.log(kind, format!("Error auto-exporting CSV: {e}"));
                    }
                }
            }
            ActionKind::Unfollow => {
                panel.log(
                    kind,
                    format!("Unfollow batch completed! Successfully processed {processed} accounts"),
                );
            }
        }
    }

    state.action_log.append(kind, accounts, None);
    panel.set_history(state.action_log.render_history());

    let summary = completion_summary(
        kind,
        processed,
        &state.data_dir.exports_dir(),
        &state.data_dir.logs_dir(),
    );
    panel.set_completion(summary.clone());
    info!(%kind, processed, "run finished");
    summary
}

// ── Tests ─────────────────────────────────────────────────────────────────────
