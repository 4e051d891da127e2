//! Integration tests for the front-end run flow.
//!
//! These drive the command bridge end to end with the scripted bot: start a
//! run, feed every event back through `handle_run_event`, then inspect the
//! files left in the data directory.

use std::path::PathBuf;
use std::sync::Arc;

use igauto_app::application::run_dispatch::RunEvent;
use igauto_app::application::start_run::{Credentials, FollowForm};
use igauto_app::infrastructure::bot::mock::{ScriptStep, ScriptedBotFactory};
use igauto_app::infrastructure::storage::config::RuntimePaths;
use igauto_app::infrastructure::ui_bridge::{self, AppState, RunUpdate};
use igauto_core::{ActionKind, Settings};
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

fn temp_root() -> PathBuf {
    std::env::temp_dir().join(format!("igauto_flow_test_{}", Uuid::new_v4()))
}

fn paths(root: &PathBuf) -> RuntimePaths {
    RuntimePaths::new(root.join("settings.json"), root.join("data"))
}

async fn finish(state: &AppState, events: &mut UnboundedReceiver<RunEvent>) -> Vec<RunUpdate> {
    let mut updates = Vec::new();
    while let Some(event) = events.recv().await {
        let done = event.is_finished();
        updates.push(ui_bridge::handle_run_event(state, event).await);
        if done {
            break;
        }
    }
    updates
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_follow_then_unfollow_records_both_runs() {
    // Arrange
    let root = temp_root();
    let factory = ScriptedBotFactory::new(vec![
        ScriptStep::Log("Logged in".into()),
        ScriptStep::Process("alice".into()),
        ScriptStep::Process("bob".into()),
    ]);
    let (state, mut events) = AppState::new(&paths(&root), Arc::new(factory.clone())).unwrap();

    let csv = root.join("unfollow.csv");
    std::fs::write(&csv, "Username,Note\nalice,x\nbob\n").unwrap();

    // Act
    let form = FollowForm {
        credentials: Credentials::new("me", "pw"),
        target_accounts: "natgeo".into(),
        follow_count: 2,
    };
    assert!(ui_bridge::start_follow(Arc::clone(&state), form).await.success);
    let follow_updates = finish(&state, &mut events).await;

    assert!(ui_bridge::import_csv(Arc::clone(&state), Some(csv)).await.success);
    let started = ui_bridge::start_unfollow(Arc::clone(&state), Credentials::new("me", "pw")).await;
    assert!(started.success, "{:?}", started.error);
    let unfollow_updates = finish(&state, &mut events).await;

    // Assert
    assert_eq!(follow_updates[0].lines, vec!["Logged in"]);
    assert!(follow_updates.iter().all(|u| u.kind == ActionKind::Follow));
    assert!(unfollow_updates.iter().all(|u| u.kind == ActionKind::Unfollow));

    let entries = state.action_log().entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, ActionKind::Follow);
    assert_eq!(entries[1].action, ActionKind::Unfollow);
    assert_eq!(entries[1].accounts, vec!["alice", "bob"]);

    let requests = factory.requests();
    assert_eq!(requests[1].accounts, vec!["alice", "bob"]);
    assert_eq!(requests[1].users_per_account, 0);

    let _ = std::fs::remove_dir_all(root);
}

#[tokio::test]
async fn test_restarted_state_reloads_settings_and_history() {
    // Arrange
    let root = temp_root();
    {
        let factory = ScriptedBotFactory::new(vec![ScriptStep::Process("zoe".into())]);
        let (state, mut events) = AppState::new(&paths(&root), Arc::new(factory)).unwrap();
        let form = FollowForm {
            credentials: Credentials::new("me", "pw"),
            target_accounts: "natgeo\nnasa".into(),
            follow_count: 300,
        };
        ui_bridge::start_follow(Arc::clone(&state), form).await;
        finish(&state, &mut events).await;
    }

    // Act
    let (state, _events) =
        AppState::new(&paths(&root), Arc::new(ScriptedBotFactory::default())).unwrap();

    // Assert
    let settings = ui_bridge::get_settings(Arc::clone(&state)).await.data.unwrap();
    assert_eq!(
        settings,
        Settings {
            username: "me".into(),
            target_accounts: "natgeo\nnasa".into(),
            follow_count: 300,
        }
    );
    let panel = ui_bridge::get_panel(Arc::clone(&state)).await.data.unwrap();
    assert!(panel.history.starts_with("=== FOLLOW - "));
    assert!(panel.history.contains("- zoe\n"));

    let _ = std::fs::remove_dir_all(root);
}

#[tokio::test]
async fn test_each_follow_batch_gets_its_own_export() {
    let root = temp_root();
    let factory = ScriptedBotFactory::new(vec![ScriptStep::Process("a".into())]);
    let (state, mut events) = AppState::new(&paths(&root), Arc::new(factory)).unwrap();

    for _ in 0..2 {
        let form = FollowForm {
            credentials: Credentials::new("me", "pw"),
            target_accounts: "natgeo".into(),
            follow_count: 1,
        };
        assert!(ui_bridge::start_follow(Arc::clone(&state), form).await.success);
        finish(&state, &mut events).await;
    }

    let mut names: Vec<String> = std::fs::read_dir(state.data_dir().exports_dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 2);
    assert!(names
        .iter()
        .all(|n| n.starts_with("followed_users_batch_") && n.ends_with(".csv")));

    let _ = std::fs::remove_dir_all(root);
}
