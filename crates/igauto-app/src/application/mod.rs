//! Application layer use cases for the front end.
//!
//! Use cases in this layer orchestrate domain objects to fulfil a user goal
//! and depend on abstractions (the [`bot::AutomationBot`] trait) rather than
//! on concrete bots, files, or a particular front end.
//!
//! # Sub-modules
//!
//! - **`bot`** – The contract the external automation bot fulfils, plus the
//!   progress sink it reports through.
//!
//! - **`run_dispatch`** – Runs one bot operation on a background thread and
//!   turns its progress and result into an ordered stream of [`RunEvent`]s
//!   that always ends with exactly one `Finished`.
//!
//! - **`start_run`** – Validates what the user entered before a run starts.
//!
//! - **`control_panel`** – Headless front-end state: per-tab logs, control
//!   enablement, the imported unfollow list, and the history view.
//!
//! [`RunEvent`]: run_dispatch::RunEvent

pub mod bot;
pub mod control_panel;
pub mod run_dispatch;
pub mod start_run;
