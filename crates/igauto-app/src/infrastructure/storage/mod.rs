//! Storage infrastructure.
//!
//! - `config` – the TOML application config and the resolved runtime paths.
//! - `settings` – the JSON settings record.
//! - `data_dir` – the `logs/` and `csv_exports/` directory layout.
//! - `action_log` – the append-only JSON action log.
//! - `batch_export` – one CSV file per finished follow batch.

pub mod action_log;
pub mod batch_export;
pub mod config;
pub mod data_dir;
pub mod settings;
