//! Main commands enum and subcommand arguments.

use std::path::PathBuf;

use clap::Subcommand;

/// Available commands for the heliograph CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Show resolved paths for all heliograph directories
    Paths,

    /// Create or update the settings file
    Setup {
        /// Accept the default directories without prompting
        #[arg(long)]
        defaults: bool,
        /// User templates directory
        #[arg(long)]
        templates_dir: Option<PathBuf>,
        /// Output directory for encoded/decoded files
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Create supplied directories instead of requiring them to exist
        #[arg(long)]
        create: bool,
    },

    /// Diagnose engine resolution, verification, and runtime dependencies
    Doctor,

    /// List available templates
    Templates,

    /// Compress an image into a text message
    Compress {
        /// Path to the source image
        image: PathBuf,
        /// Template name to encode against
        template: String,
        /// Date-time group stamped into the output file name
        dtg: String,
    },

    /// Decompress a message back into an image
    Decompress {
        /// Template name the message was encoded with
        template: String,
        /// Path to the message file
        message: Option<PathBuf>,
        /// Inline message text instead of a file
        #[arg(long, conflicts_with = "message")]
        text: Option<String>,
    },

    /// Run a raw engine command
    Run {
        /// Engine command name (e.g. "list-templates")
        command: String,
        /// Positional arguments passed through to the engine
        args: Vec<String>,
    },
}
