//! CLI adapter for the heliograph engine orchestrator.

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod parser;
pub mod prompt;

pub use bootstrap::{BootstrapOptions, CliContext, bootstrap, open_store};
pub use commands::Commands;
pub use parser::Cli;
