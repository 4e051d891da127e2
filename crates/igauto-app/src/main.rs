//! igauto command-line front end.
//!
//! ```text
//! main()
//!  └─ load config (--config or platform file)
//!  └─ AppState::new()          -- data dir, settings, history, event channel
//!  └─ command
//!       ├─ follow / unfollow   -- start a run, then pump events until Finished
//!       ├─ history             -- print the action log
//!       ├─ settings            -- print the saved settings
//!       └─ check               -- validate usernames
//! ```
//!
//! Progress lines go to stdout; tracing output goes to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use igauto_core::{parse_target_lines, validate_username, ActionKind, Settings};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use igauto_app::application::run_dispatch::RunEvent;
use igauto_app::application::start_run::{Credentials, FollowForm};
use igauto_app::infrastructure::bot::process::ProcessBotFactory;
use igauto_app::infrastructure::storage::config::{load_config, RuntimePaths};
use igauto_app::infrastructure::ui_bridge::{self, AppState};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Bulk follow/unfollow front end for an external automation bot.
#[derive(Debug, Parser)]
#[command(name = "igauto", version)]
struct Cli {
    /// Config file (default: platform config dir `igauto/config.toml`).
    #[arg(long, global = true, env = "IGAUTO_CONFIG")]
    config: Option<PathBuf>,

    /// Settings file, overriding `[paths] settings_file`.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Data directory, overriding `[paths] data_dir`.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Follow users from the followers of each target account.
    ///
    /// Options left out fall back to the saved settings.
    Follow {
        #[command(flatten)]
        login: Login,

        /// Target account; repeat for several.
        #[arg(long = "target", value_name = "ACCOUNT")]
        targets: Vec<String>,

        /// Users to follow per target account (1-1000).
        #[arg(long)]
        count: Option<u32>,
    },
    /// Unfollow every valid username in a CSV file.
    Unfollow {
        #[command(flatten)]
        login: Login,

        /// CSV whose first column holds the usernames.
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print the action history.
    History,
    /// Print the saved settings as JSON.
    Settings,
    /// Check usernames against the username rules.
    Check {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Debug, clap::Args)]
struct Login {
    /// Account to log in as (default: saved username).
    #[arg(long)]
    username: Option<String>,

    #[arg(long, env = "IG_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl Login {
    fn credentials(&self, saved: &Settings) -> Credentials {
        Credentials::new(
            self.username.clone().unwrap_or_else(|| saved.username.clone()),
            self.password.clone().unwrap_or_default(),
        )
    }
}

fn follow_form(login: &Login, targets: &[String], count: Option<u32>, saved: &Settings) -> FollowForm {
    FollowForm {
        credentials: login.credentials(saved),
        target_accounts: if targets.is_empty() {
            saved.target_accounts.clone()
        } else {
            targets.join("\n")
        },
        follow_count: count.unwrap_or(saved.follow_count),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("failed to load config")?;

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.app.log_level)),
        )
        .init();

    let paths = RuntimePaths::resolve(&config.paths, cli.settings.clone(), cli.data_dir.clone());
    let factory = Arc::new(ProcessBotFactory::new(
        config.bot.program.clone(),
        config.bot.args.clone(),
    ));
    let open_state = || {
        AppState::new(&paths, factory.clone()).with_context(|| {
            format!("failed to prepare data directory {}", paths.data_dir.display())
        })
    };

    match cli.command {
        Command::Check { names } => check_names(&names),
        Command::Follow {
            login,
            targets,
            count,
        } => {
            let (state, events) = open_state()?;
            let saved = state.settings.lock().await.clone();
            let form = follow_form(&login, &targets, count, &saved);
            info!(targets = parse_target_lines(&form.target_accounts).len(), "starting follow run");

            let started = ui_bridge::start_follow(Arc::clone(&state), form).await;
            if let Some(e) = started.error {
                print_new_lines(&state, ActionKind::Follow, 0).await;
                bail!(e);
            }
            run_to_completion(&state, events).await?;
        }
        Command::Unfollow { login, csv } => {
            let (state, events) = open_state()?;
            let imported = ui_bridge::import_csv(Arc::clone(&state), Some(csv)).await;
            print_new_lines(&state, ActionKind::Unfollow, 0).await;
            if let Some(e) = imported.error {
                bail!(e);
            }

            let saved = state.settings.lock().await.clone();
            let seen = state.panel.lock().await.log_lines(ActionKind::Unfollow).len();
            let started =
                ui_bridge::start_unfollow(Arc::clone(&state), login.credentials(&saved)).await;
            if let Some(e) = started.error {
                print_new_lines(&state, ActionKind::Unfollow, seen).await;
                bail!(e);
            }
            run_to_completion(&state, events).await?;
        }
        Command::History => {
            let (state, _events) = open_state()?;
            if let Some(history) = ui_bridge::refresh_history(state).await.data {
                print!("{history}");
            }
        }
        Command::Settings => {
            let (state, _events) = open_state()?;
            let settings = state.settings.lock().await.clone();
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}

/// Feeds run events to the bridge and prints each new log line until the
/// run finishes or Ctrl-C is pressed.
///
/// # Errors
///
/// Returns an error carrying the bot's failure text if the run failed.
async fn run_to_completion(
    state: &Arc<AppState>,
    events: UnboundedReceiver<RunEvent>,
) -> anyhow::Result<()> {
    tokio::select! {
        failure = pump_events(state, events) => match failure {
            Some(reason) => bail!("run failed: {reason}"),
            None => Ok(()),
        },
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted; the run is abandoned and will not be logged");
            Ok(())
        }
    }
}

/// Handles events until `Finished` and returns its failure text, if any.
async fn pump_events(
    state: &AppState,
    mut events: UnboundedReceiver<RunEvent>,
) -> Option<String> {
    while let Some(event) = events.recv().await {
        let failure = match &event {
            RunEvent::Finished { failure, .. } => failure.clone(),
            RunEvent::Progress { .. } => None,
        };
        let update = ui_bridge::handle_run_event(state, event).await;
        for line in &update.lines {
            println!("{line}");
        }
        if let Some(summary) = update.completion {
            println!("\n{summary}");
            return failure;
        }
    }
    None
}

async fn print_new_lines(state: &AppState, kind: ActionKind, from: usize) {
    let panel = state.panel.lock().await;
    for line in panel.log_lines(kind).iter().skip(from) {
        println!("{line}");
    }
}

fn check_names(names: &[String]) {
    for name in names {
        match validate_username(name) {
            Ok(()) => println!("{name}: valid"),
            Err(e) => println!("{name}: invalid ({e})"),
        }
    }
}
