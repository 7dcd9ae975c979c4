//! Setup command handler.
//!
//! Creates or rewrites the settings file. This is the CLI's rendition of
//! the first-run wizard: defaults derive from the executable-adjacent root,
//! and either flag can override its directory independently. User-supplied
//! directories must already exist and be writable unless `--create` is
//! given; default directories are left to the provisioner.

use std::path::PathBuf;

use anyhow::{Context, Result};

use helio_core::paths::{DirectoryCreationStrategy, ensure_directory};
use helio_core::settings::UserSettings;

use crate::bootstrap::open_store;

/// Commit settings, creating the per-user data directory if needed.
pub fn execute(
    defaults: bool,
    templates_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    create: bool,
) -> Result<()> {
    let (_, paths, store) = open_store()?;

    let base = if defaults {
        UserSettings::defaults(&paths.exe_root)
    } else {
        store
            .load()
            .unwrap_or_else(|| UserSettings::defaults(&paths.exe_root))
    };

    let settings = apply_overrides(base, templates_dir, output_dir, create)?;

    store.save(&settings).context("failed to write settings")?;

    println!("Settings written to {}", store.path().display());
    println!("  templates: {}", settings.templates_dir.display());
    println!("  output:    {}", settings.output_dir.display());

    Ok(())
}

/// Apply directory overrides, validating each supplied directory.
///
/// Supplied directories must exist and be writable; `create` switches the
/// missing-directory strategy from rejection to recursive creation.
fn apply_overrides(
    mut settings: UserSettings,
    templates_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    create: bool,
) -> Result<UserSettings> {
    let strategy = if create {
        DirectoryCreationStrategy::AutoCreate
    } else {
        DirectoryCreationStrategy::Disallow
    };

    if let Some(dir) = templates_dir {
        ensure_directory(&dir, strategy)
            .with_context(|| format!("templates directory {} is not usable", dir.display()))?;
        settings.templates_dir = dir;
    }
    if let Some(dir) = output_dir {
        ensure_directory(&dir, strategy)
            .with_context(|| format!("output directory {} is not usable", dir.display()))?;
        settings.output_dir = dir;
    }
    settings.first_run = false;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn base_settings() -> UserSettings {
        UserSettings::defaults(Path::new("/opt/heliograph"))
    }

    #[test]
    fn missing_supplied_directory_is_rejected_without_create() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");

        let result = apply_overrides(base_settings(), Some(missing), None, false);
        assert!(result.is_err());
    }

    #[test]
    fn create_flag_makes_missing_directories() {
        let dir = tempdir().unwrap();
        let templates = dir.path().join("my-templates");
        let output = dir.path().join("my-output");

        let settings = apply_overrides(
            base_settings(),
            Some(templates.clone()),
            Some(output.clone()),
            true,
        )
        .unwrap();

        assert!(templates.is_dir());
        assert!(output.is_dir());
        assert_eq!(settings.templates_dir, templates);
        assert_eq!(settings.output_dir, output);
        assert!(!settings.first_run);
    }

    #[test]
    fn existing_directory_is_accepted_without_create() {
        let dir = tempdir().unwrap();

        let settings = apply_overrides(
            base_settings(),
            Some(dir.path().to_path_buf()),
            None,
            false,
        )
        .unwrap();

        assert_eq!(settings.templates_dir, dir.path());
        // Untouched override keeps its prior value.
        assert_eq!(settings.output_dir, base_settings().output_dir);
    }
}
