//! Infrastructure layer for the igauto front end.
//!
//! Contains the adapters that touch the outside world: file-system storage,
//! the external bot program, and the command bridge the front end calls.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `igauto_core`, but MUST NOT be imported by the `application` layer
//! outside of tests.

pub mod bot;
pub mod storage;
pub mod ui_bridge;
