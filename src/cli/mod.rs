//! Command-line interface for `fixd`.
//!
//! This module provides the CLI parsing and command routing using clap.

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::{CliOverrides, Config};
use crate::logging;

/// `fixd` - civic issue desk.
#[derive(Parser, Debug)]
#[command(name = "fixd")]
#[command(
    author,
    version,
    about = "Report, upvote and triage civic issues",
    long_about = None,
    after_help = "State lives in memory for one invocation; drive it with `fixd run`."
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Output format: text (default) or json
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Identity to act as
    #[arg(long, global = true)]
    pub identity: Option<String>,

    /// Grant administrator privileges to the acting identity
    #[arg(long, global = true)]
    pub admin: bool,

    /// Load the built-in sample issues first
    #[arg(long, global = true)]
    pub seed: bool,

    /// Extra config file, read after the project config
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit diagnostics as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Also append diagnostics to this file
    #[arg(long, global = true, env = "FIXD_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a JSON Lines script of issue commands
    Run(RunArgs),

    /// List issue categories and their departments
    Categories,

    /// List departments that can be assigned
    Departments,

    /// Show version information
    Version,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Script path, or `-` for stdin
    pub script: PathBuf,

    /// Stop at the first failing command
    #[arg(long)]
    pub fail_fast: bool,
}

impl Cli {
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            identity: self.identity.clone(),
            admin: self.admin,
            seed: self.seed,
            config_path: self.config.clone(),
        }
    }
}

/// Run the CLI.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet, cli.log_json, cli.log_file.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    match &cli.command {
        Some(Commands::Run(args)) => {
            let overrides = cli.overrides();
            let config = Config::load(&overrides)?;
            commands::run::execute(args, config, &overrides, cli.json)?;
        }
        Some(Commands::Categories) => commands::enums::categories(cli.json)?,
        Some(Commands::Departments) => commands::enums::departments(cli.json)?,
        Some(Commands::Version) => commands::version::execute(cli.json)?,
        None => println!("fixd - civic issue desk. Use --help for usage."),
    }

    Ok(())
}
