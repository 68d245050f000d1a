//! Version command implementation.

use serde::Serialize;

use crate::error::Result;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
    engine: &'a str,
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };

    if json {
        let output = VersionOutput {
            version,
            build,
            engine: "civic-core",
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("fixd version {version} ({build})");
    Ok(())
}
