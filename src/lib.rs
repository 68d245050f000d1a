//! `fixdelhi` - civic issue desk front end.
//!
//! This crate provides the `fixd` CLI on top of the `civic-core` engine.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`cli`] - Command-line interface using clap
//! - [`session`] - JSON Lines scripts run against one in-memory desk
//! - [`config`] - Layered YAML/env configuration
//! - [`logging`] - tracing subscriber setup
//! - [`error`] - Error types and handling
//! - [`format`] - Output formatting (text, JSON)

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod session;

pub use error::{FixdError, Result};

/// Run the CLI application.
///
/// This is the main entry point called from `main()`.
///
/// # Errors
///
/// Returns an error if command execution fails.
pub fn run() -> anyhow::Result<()> {
    cli::run()
}
