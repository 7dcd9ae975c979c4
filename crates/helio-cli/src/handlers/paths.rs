//! Paths command handler.
//!
//! Displays every resolved path in `key = value` form. The first tool to
//! reach for when the engine or templates end up in the wrong place.

use anyhow::Result;

use helio_core::settings::UserSettings;

use crate::bootstrap::open_store;

/// Resolve and print all paths used by heliograph.
pub fn execute() -> Result<()> {
    let (facts, paths, store) = open_store()?;
    let settings = store
        .load()
        .unwrap_or_else(|| UserSettings::defaults(&paths.exe_root));

    println!("mode              = {:?}", facts.mode);
    println!("os                = {}", facts.profile.os);
    println!("install_root      = {}", paths.install_root.display());
    println!("exe_root          = {}", paths.exe_root.display());
    println!("user_data_root    = {}", paths.user_data_root.display());
    println!("settings_file     = {}", store.path().display());
    println!("bundled_templates = {}", paths.bundled_templates_dir().display());
    println!("user_templates    = {}", settings.templates_dir.display());
    println!("output_dir        = {}", settings.output_dir.display());

    Ok(())
}
