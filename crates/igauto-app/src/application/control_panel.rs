//! Headless front-end state.
//!
//! `ControlPanel` holds what a window would show: one status log per tab,
//! the history view, the imported-file label, and which controls are
//! enabled.  It is only mutated from the front-end context; the worker
//! thread never touches it.
//!
//! # Control enablement
//!
//! ```text
//! follow control    enabled  ⇔ no run active
//! unfollow control  enabled  ⇔ no run active ∧ an unfollow list is imported
//! ```
//!
//! Only one run may be active at a time, whatever its kind.

use std::path::{Path, PathBuf};

use igauto_core::{ActionKind, ImportReport};
use tracing::warn;

use crate::application::bot::RunId;
use crate::application::start_run::InputError;

/// State of the "imported file" label on the unfollow tab.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FileLabel {
    /// Nothing has been attempted yet.
    #[default]
    Empty,
    /// A file was imported successfully.
    Selected(PathBuf),
    /// The file dialog was cancelled.
    NoFileSelected,
    /// The chosen file could not be read or parsed.
    ImportFailed,
}

impl FileLabel {
    pub fn text(&self) -> String {
        match self {
            FileLabel::Empty => String::new(),
            FileLabel::Selected(path) => format!("Selected file: {}", path.display()),
            FileLabel::NoFileSelected => "No file selected".to_string(),
            FileLabel::ImportFailed => "Error importing file".to_string(),
        }
    }

    /// `true` for the states shown in the error colour.
    pub fn is_error(&self) -> bool {
        matches!(self, FileLabel::NoFileSelected | FileLabel::ImportFailed)
    }
}

/// The run currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveRun {
    pub kind: ActionKind,
    /// Set once the worker has been dispatched.
    pub run_id: Option<RunId>,
}

/// View model for the whole front end.
#[derive(Debug, Default)]
pub struct ControlPanel {
    follow_log: Vec<String>,
    unfollow_log: Vec<String>,
    history: String,
    file_label: FileLabel,
    unfollow_list: Option<Vec<String>>,
    active_run: Option<ActiveRun>,
    completion: Option<String>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Status logs ───────────────────────────────────────────────────────────

    /// Appends a line to the status log of `kind`'s tab.
    pub fn log(&mut self, kind: ActionKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            ActionKind::Follow => self.follow_log.push(message),
            ActionKind::Unfollow => self.unfollow_log.push(message),
        }
    }

    pub fn log_lines(&self, kind: ActionKind) -> &[String] {
        match kind {
            ActionKind::Follow => &self.follow_log,
            ActionKind::Unfollow => &self.unfollow_log,
        }
    }

    // ── Controls ──────────────────────────────────────────────────────────────

    pub fn follow_enabled(&self) -> bool {
        self.active_run.is_none()
    }

    pub fn unfollow_enabled(&self) -> bool {
        self.active_run.is_none() && self.unfollow_list.is_some()
    }

    pub fn active_run(&self) -> Option<ActiveRun> {
        self.active_run
    }

    /// Claims the panel for a `kind` run, disabling both controls.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::RunInProgress`] if any run is already active.
    pub fn begin_run(&mut self, kind: ActionKind) -> Result<(), InputError> {
        if let Some(active) = self.active_run {
            return Err(InputError::RunInProgress(active.kind));
        }
        self.active_run = Some(ActiveRun { kind, run_id: None });
        self.completion = None;
        Ok(())
    }

    /// Records the id of the dispatched worker for the active run.
    pub fn attach_run(&mut self, run_id: RunId) {
        if let Some(active) = self.active_run.as_mut() {
            active.run_id = Some(run_id);
        }
    }

    /// Releases the panel after a run that never got dispatched.
    pub fn abort_run(&mut self) {
        self.active_run = None;
    }

    /// Releases the panel when `run_id` finishes.  Returns `false` (and
    /// changes nothing) if `run_id` is not the active run.
    pub fn end_run(&mut self, run_id: RunId) -> bool {
        match self.active_run {
            Some(ActiveRun { run_id: Some(active), .. }) if active == run_id => {
                self.active_run = None;
                true
            }
            _ => {
                warn!(%run_id, "finish event for a run that is not active");
                false
            }
        }
    }

    // ── CSV import ────────────────────────────────────────────────────────────

    pub fn file_label(&self) -> &FileLabel {
        &self.file_label
    }

    pub fn unfollow_list(&self) -> Option<&[String]> {
        self.unfollow_list.as_deref()
    }

    /// The file dialog was cancelled.
    pub fn import_cancelled(&mut self) {
        self.file_label = FileLabel::NoFileSelected;
        self.unfollow_list = None;
    }

    /// Stores a successful import of `path` and logs its summary.
    pub fn import_succeeded(&mut self, path: &Path, report: ImportReport) {
        self.file_label = FileLabel::Selected(path.to_path_buf());

        self.log(
            ActionKind::Unfollow,
            format!(
                "Successfully imported {} valid usernames from CSV",
                report.usernames.len()
            ),
        );
        if !report.invalid.is_empty() {
            self.log(
                ActionKind::Unfollow,
                format!(
                    "Skipped {} invalid usernames: {:?}",
                    report.invalid.len(),
                    report.invalid_preview()
                ),
            );
        }
        if !report.duplicates.is_empty() {
            self.log(
                ActionKind::Unfollow,
                format!("Ignored {} duplicate usernames", report.duplicates.len()),
            );
        }

        self.unfollow_list = Some(report.usernames);
    }

    /// The chosen file could not be imported.
    pub fn import_failed(&mut self, error: &str) {
        self.file_label = FileLabel::ImportFailed;
        self.unfollow_list = None;
        self.log(ActionKind::Unfollow, format!("Error importing CSV: {error}"));
    }

    // ── History and completion ────────────────────────────────────────────────

    pub fn history(&self) -> &str {
        &self.history
    }

    pub fn set_history(&mut self, text: String) {
        self.history = text;
    }

    /// Text of the most recent completion notice, if a run has finished
    /// since the last one started.
    pub fn completion(&self) -> Option<&str> {
        self.completion.as_deref()
    }

    pub fn set_completion(&mut self, text: String) {
        self.completion = Some(text);
    }
}

/// Builds the completion notice shown when a run finishes.
///
/// A follow run that processed accounts also names where its CSV export and
/// the action log were written.
pub fn completion_summary(
    kind: ActionKind,
    processed: usize,
    exports_dir: &Path,
    logs_dir: &Path,
) -> String {
    if kind == ActionKind::Follow && processed > 0 {
        format!(
            "Follow operation completed!\n\n\
             Processed: {processed} accounts\n\
             Single CSV file created\n\n\
             CSV exports: {}\n\
             Log files: {}",
            exports_dir.display(),
            logs_dir.display()
        )
    } else {
        format!("{} operation completed.", kind.title())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn report(usernames: &[&str], invalid: &[&str]) -> ImportReport {
        ImportReport {
            usernames: usernames.iter().map(|s| s.to_string()).collect(),
            invalid: invalid.iter().map(|s| s.to_string()).collect(),
            ..ImportReport::default()
        }
    }

    #[test]
    fn test_new_panel_has_follow_enabled_and_unfollow_disabled() {
        let panel = ControlPanel::new();
        assert!(panel.follow_enabled());
        assert!(!panel.unfollow_enabled());
        assert_eq!(panel.file_label(), &FileLabel::Empty);
    }

    #[test]
    fn test_logs_are_kept_per_tab() {
        let mut panel = ControlPanel::new();
        panel.log(ActionKind::Follow, "f1");
        panel.log(ActionKind::Unfollow, "u1");
        panel.log(ActionKind::Follow, "f2");

        assert_eq!(panel.log_lines(ActionKind::Follow), ["f1", "f2"]);
        assert_eq!(panel.log_lines(ActionKind::Unfollow), ["u1"]);
    }

    #[test]
    fn test_begin_run_disables_both_controls() {
        // Arrange
        let mut panel = ControlPanel::new();
        panel.import_succeeded(Path::new("list.csv"), report(&["a"], &[]));
        assert!(panel.unfollow_enabled());

        // Act
        panel.begin_run(ActionKind::Follow).expect("idle panel");

        // Assert
        assert!(!panel.follow_enabled());
        assert!(!panel.unfollow_enabled());
    }

    #[test]
    fn test_second_run_is_rejected_while_one_is_active() {
        let mut panel = ControlPanel::new();
        panel.begin_run(ActionKind::Follow).expect("idle panel");

        assert_eq!(
            panel.begin_run(ActionKind::Unfollow),
            Err(InputError::RunInProgress(ActionKind::Follow))
        );
        assert_eq!(
            panel.begin_run(ActionKind::Follow),
            Err(InputError::RunInProgress(ActionKind::Follow))
        );
    }

    #[test]
    fn test_end_run_reenables_controls_for_matching_run() {
        let mut panel = ControlPanel::new();
        let run_id = Uuid::new_v4();
        panel.begin_run(ActionKind::Follow).unwrap();
        panel.attach_run(run_id);

        assert!(panel.end_run(run_id));
        assert!(panel.follow_enabled());
        assert!(panel.active_run().is_none());
    }

    #[test]
    fn test_end_run_ignores_unknown_run() {
        let mut panel = ControlPanel::new();
        panel.begin_run(ActionKind::Follow).unwrap();
        panel.attach_run(Uuid::new_v4());

        assert!(!panel.end_run(Uuid::new_v4()));
        assert!(!panel.follow_enabled());
    }

    #[test]
    fn test_abort_run_releases_panel() {
        let mut panel = ControlPanel::new();
        panel.begin_run(ActionKind::Unfollow).unwrap();
        panel.abort_run();
        assert!(panel.follow_enabled());
    }

    #[test]
    fn test_import_success_sets_label_list_and_log() {
        // Arrange
        let mut panel = ControlPanel::new();

        // Act
        panel.import_succeeded(Path::new("/tmp/list.csv"), report(&["a", "b"], &["123"]));

        // Assert
        assert_eq!(panel.file_label().text(), "Selected file: /tmp/list.csv");
        assert!(!panel.file_label().is_error());
        assert_eq!(panel.unfollow_list().unwrap(), ["a", "b"]);
        assert_eq!(
            panel.log_lines(ActionKind::Unfollow),
            [
                "Successfully imported 2 valid usernames from CSV",
                "Skipped 1 invalid usernames: [\"123\"]",
            ]
        );
    }

    #[test]
    fn test_import_failure_clears_list_and_disables_unfollow() {
        let mut panel = ControlPanel::new();
        panel.import_succeeded(Path::new("ok.csv"), report(&["a"], &[]));

        panel.import_failed("stream did not contain valid UTF-8");

        assert_eq!(panel.file_label(), &FileLabel::ImportFailed);
        assert!(panel.file_label().is_error());
        assert!(panel.unfollow_list().is_none());
        assert!(!panel.unfollow_enabled());
        assert!(panel
            .log_lines(ActionKind::Unfollow)
            .last()
            .unwrap()
            .starts_with("Error importing CSV: "));
    }

    #[test]
    fn test_cancelled_import_shows_no_file_selected() {
        let mut panel = ControlPanel::new();
        panel.import_cancelled();
        assert_eq!(panel.file_label().text(), "No file selected");
        assert!(!panel.unfollow_enabled());
    }

    #[test]
    fn test_begin_run_clears_previous_completion() {
        let mut panel = ControlPanel::new();
        panel.set_completion("done".into());
        panel.begin_run(ActionKind::Follow).unwrap();
        assert!(panel.completion().is_none());
    }

    #[test]
    fn test_completion_summary_for_follow_names_directories() {
        let text = completion_summary(
            ActionKind::Follow,
            3,
            Path::new("/data/csv_exports"),
            Path::new("/data/logs"),
        );
        assert!(text.contains("Processed: 3 accounts"));
        assert!(text.contains("CSV exports: /data/csv_exports"));
        assert!(text.contains("Log files: /data/logs"));
    }

    #[test]
    fn test_completion_summary_without_accounts_is_short() {
        let dirs = (Path::new("e"), Path::new("l"));
        assert_eq!(
            completion_summary(ActionKind::Follow, 0, dirs.0, dirs.1),
            "Follow operation completed."
        );
        assert_eq!(
            completion_summary(ActionKind::Unfollow, 4, dirs.0, dirs.1),
            "Unfollow operation completed."
        );
    }
}
