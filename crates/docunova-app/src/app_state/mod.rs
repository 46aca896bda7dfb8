//! Top-level application state.
//!
//! Wires config, persisted state, the HTTP backend, caches and the
//! conversation session together, and drives them from a terminal REPL.

mod ask;
mod command;
mod core;
mod dispatch;
mod init;
mod render;
mod run;
mod shutdown;

pub use core::DocunovaApp;
pub use init::StateLocation;
