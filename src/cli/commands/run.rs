//! Run command implementation.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::cli::RunArgs;
use crate::config::{CliOverrides, Config};
use crate::error::{FixdError, Result};
use crate::format::{StepRecord, format_reply};
use crate::session::{ScriptLine, Session, parse_script};

/// Execute the run command.
///
/// The whole script is parsed before any command runs, so a syntax error
/// leaves nothing half-applied. Failing commands are reported and the run
/// continues unless `--fail-fast` is set.
///
/// # Errors
///
/// Returns `ScriptParse` for a malformed line, `FileNotFound` for a
/// missing script, or `ScriptFailed` if any command failed.
pub fn execute(args: &RunArgs, config: Config, overrides: &CliOverrides, json: bool) -> Result<()> {
    let lines = read_script(&args.script)?;
    debug!(commands = lines.len(), "script parsed");

    let mut session = Session::new(config, overrides.admin)?;
    let mut executed = 0;
    let mut failed = 0;

    for ScriptLine { line, command } in lines {
        let op = command.name();
        let outcome = session.execute(command);
        executed += 1;

        if json {
            println!("{}", serde_json::to_string(&StepRecord::from_outcome(line, op, &outcome))?);
        }
        match outcome {
            Ok(reply) => {
                if !json {
                    println!("{}", format_reply(&reply));
                }
            }
            Err(err) => {
                failed += 1;
                warn!(line, op, kind = %err.kind(), "command failed");
                if !json {
                    eprintln!("line {line}: {op}: {err}");
                }
                if args.fail_fast {
                    break;
                }
            }
        }
    }

    if failed > 0 {
        return Err(FixdError::ScriptFailed {
            failed,
            total: executed,
        });
    }
    Ok(())
}

fn read_script(path: &Path) -> Result<Vec<ScriptLine>> {
    if path.as_os_str() == "-" {
        return parse_script(io::stdin().lock());
    }
    if !path.exists() {
        return Err(FixdError::FileNotFound(path.to_path_buf()));
    }
    parse_script(BufReader::new(File::open(path)?))
}
