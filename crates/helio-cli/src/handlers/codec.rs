//! Compress and decompress command handlers.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::bootstrap::CliContext;

/// Compress an image into a dated text message.
pub async fn compress(
    ctx: &CliContext,
    image: &Path,
    template: &str,
    dtg: &str,
) -> Result<()> {
    if !image.is_file() {
        bail!("image not found: {}", image.display());
    }

    let (_, output_path) = ctx
        .service()
        .compress(&image.to_string_lossy(), template, dtg)
        .await?;

    println!("Wrote {}", output_path.display());
    Ok(())
}

/// Decompress a message file (or inline text) back into an image.
pub async fn decompress(
    ctx: &CliContext,
    template: &str,
    message: Option<PathBuf>,
    text: Option<String>,
) -> Result<()> {
    let message_path = match (message, text) {
        (Some(path), _) => {
            if !path.is_file() {
                bail!("message file not found: {}", path.display());
            }
            path
        }
        (None, Some(text)) => ctx.service().save_scratch_message(&text)?,
        (None, None) => bail!("provide a message file or --text"),
    };

    let (_, output_path) = ctx
        .service()
        .decompress(&message_path.to_string_lossy(), template)
        .await?;

    println!("Wrote {}", output_path.display());
    Ok(())
}
