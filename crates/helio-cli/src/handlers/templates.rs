//! Templates command handler.

use anyhow::Result;

use crate::bootstrap::CliContext;

/// List available templates, user directory first.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let templates = ctx.service().list_templates().await?;

    if templates.is_empty() {
        println!("No templates found.");
        println!("Add template files to {}", ctx.service().layout().user_templates_dir.display());
        return Ok(());
    }

    for name in templates {
        println!("{name}");
    }
    Ok(())
}
