//! Command-line interface.
//!
//! [`execute`] dispatches a parsed [`Cli`](command::Cli) to its handler.

pub mod check;
pub mod command;
pub mod output;
pub mod paths;
pub mod run;
pub mod stats;

use command::{CheckCommand, Cli, Commands};

use crate::error::Result;

/// Run the parsed command.
///
/// # Errors
///
/// Returns the handler's error; the caller decides the exit code.
pub async fn execute(cli: Cli) -> Result<()> {
    output::configure(output::OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    match cli.command {
        Commands::Run(args) => run::execute(&args).await,
        Commands::Stats(args) => stats::execute(&args),
        Commands::Check(CheckCommand::Config(args)) => check::execute_config(&args.config),
    }
}
