//! Bot implementations.
//!
//! - **`process`** – drives an external bot program over a line-oriented
//!   JSON protocol.  This is what the `igauto` binary uses.
//! - **`mock`** – plays back a fixed script; used by the tests.

pub mod mock;
pub mod process;
