//! CLI entry point, the composition root.
//!
//! Commands that talk to the engine go through [`bootstrap`]; `paths` and
//! `setup` work on the bare settings store so they stay usable before any
//! settings exist.

use clap::Parser;

use helio_cli::{BootstrapOptions, Cli, Commands, bootstrap, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    let options = BootstrapOptions {
        assume_yes: cli.assume_yes,
        skip_verify: cli.no_verify,
    };

    match command {
        Commands::Paths => {
            handlers::paths::execute()?;
        }
        Commands::Setup {
            defaults,
            templates_dir,
            output_dir,
            create,
        } => {
            handlers::setup::execute(defaults, templates_dir, output_dir, create)?;
        }
        Commands::Doctor => {
            handlers::doctor::execute().await?;
        }
        Commands::Templates => {
            let ctx = bootstrap(options).await?;
            handlers::templates::execute(&ctx).await?;
        }
        Commands::Compress {
            image,
            template,
            dtg,
        } => {
            let ctx = bootstrap(options).await?;
            handlers::codec::compress(&ctx, &image, &template, &dtg).await?;
        }
        Commands::Decompress {
            template,
            message,
            text,
        } => {
            let ctx = bootstrap(options).await?;
            handlers::codec::decompress(&ctx, &template, message, text).await?;
        }
        Commands::Run { command, args } => {
            let ctx = bootstrap(options).await?;
            handlers::run::execute(&ctx, &command, args).await?;
        }
    }

    Ok(())
}
