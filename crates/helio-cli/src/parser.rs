//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the heliograph engine orchestrator.
///
/// Top-level parser handling global options and subcommand dispatch.
#[derive(Parser)]
#[command(name = "helio")]
#[command(about = "Encode and decode imagery through the heliograph engine")]
#[command(version)]
pub struct Cli {
    /// Answer yes to all confirmation prompts
    #[arg(short = 'y', long = "yes", global = true)]
    pub assume_yes: bool,

    /// Skip the engine verification probe before running commands
    #[arg(long = "no-verify", global = true)]
    pub no_verify: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_args_parse() {
        let cli = Cli::parse_from(["helio", "--yes", "--no-verify", "templates"]);
        assert!(cli.assume_yes);
        assert!(cli.no_verify);
    }
}
