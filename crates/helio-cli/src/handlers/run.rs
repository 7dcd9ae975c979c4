//! Raw engine command handler.

use anyhow::Result;

use crate::bootstrap::CliContext;

/// Run an arbitrary engine command and pretty-print the JSON payload.
pub async fn execute(ctx: &CliContext, command: &str, args: Vec<String>) -> Result<()> {
    let payload = ctx.service().run_command(command, args).await?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
