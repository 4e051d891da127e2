//! Domain entities for igauto.
//!
//! This module contains pure business logic with no infrastructure
//! dependencies.  Code in the application crate depends on these types,
//! but nothing here depends on the application crate, so every rule can be
//! unit-tested in isolation.

/// Username acceptance rules.
pub mod username;

/// The persisted front-end settings record.
pub mod settings;

/// Action kinds and action log entries.
pub mod action;
