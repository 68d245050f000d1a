//! Diagnostic logging setup.
//!
//! Diagnostics always go to stderr so stdout stays clean for command
//! output. `RUST_LOG` takes precedence over the verbosity flags.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::error::{FixdError, Result};

/// Default filter directive for a verbosity setting.
#[must_use]
pub const fn level_for(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// With `json` set, stderr lines are JSON objects. With `log_file` set,
/// events are also appended to that file without ANSI colours.
///
/// # Errors
///
/// Returns `Logging` if the log file can't be opened or a subscriber is
/// already installed.
pub fn init_logging(verbose: u8, quiet: bool, json: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbose, quiet)));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| FixdError::Logging(format!("cannot open {}: {e}", path.display())))?;
            Some(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        }
        None => None,
    };

    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!json).then(|| {
        fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| FixdError::Logging(e.to_string()))
}
