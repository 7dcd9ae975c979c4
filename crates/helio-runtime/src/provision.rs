//! Directory provisioning and one-time template seeding.
//!
//! Best-effort infrastructure: failures are logged, never fatal to startup.
//! Template lookup precedence is user-directory-first, bundled-second — user
//! customizations shadow bundled templates, and every engine invocation
//! receives both directories so it can honor that order.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use helio_core::paths::{AppPaths, DirectoryCreationStrategy, ensure_directory};
use helio_core::settings::UserSettings;
use tracing::{debug, info, warn};

/// Marker file recording that the user templates directory has been seeded
/// (or deliberately left with user content). Its presence suppresses any
/// further seeding, so emptying the directory does not bring the bundled
/// templates back.
const SEEDED_MARKER: &str = ".seeded";

/// The directories an engine invocation depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryLayout {
    /// Read-only templates shipped inside the install tree.
    pub bundled_templates_dir: PathBuf,
    /// User-writable templates; shadows the bundled set.
    pub user_templates_dir: PathBuf,
    /// Output directory for engine artifacts.
    pub output_dir: PathBuf,
}

impl DirectoryLayout {
    /// Derive the layout from resolved paths and committed settings.
    #[must_use]
    pub fn new(paths: &AppPaths, settings: &UserSettings) -> Self {
        Self {
            bundled_templates_dir: paths.bundled_templates_dir(),
            user_templates_dir: settings.templates_dir.clone(),
            output_dir: settings.output_dir.clone(),
        }
    }
}

/// Ensures required directories exist and performs the one-time seeding of
/// user templates from the bundled set.
#[derive(Debug, Default)]
pub struct DirectoryProvisioner;

impl DirectoryProvisioner {
    /// Ensure the layout's directories exist and seed user templates once.
    ///
    /// Best-effort: any failure is logged and swallowed; the provisioner is
    /// infrastructure, not a correctness gate. Missing bundled templates are
    /// a packaging defect worth a warning, nothing more.
    pub fn provision(&self, layout: &DirectoryLayout) {
        if let Err(e) = self.try_provision(layout) {
            warn!("directory provisioning incomplete: {e}");
        }
    }

    fn try_provision(&self, layout: &DirectoryLayout) -> io::Result<()> {
        for dir in [&layout.user_templates_dir, &layout.output_dir] {
            if let Err(e) = ensure_directory(dir, DirectoryCreationStrategy::AutoCreate) {
                warn!(path = %dir.display(), "failed to provision directory: {e}");
            }
        }

        if !layout.bundled_templates_dir.exists() {
            warn!(
                path = %layout.bundled_templates_dir.display(),
                "bundled templates directory not found; the install may be incomplete"
            );
            return Ok(());
        }

        self.seed_user_templates(layout)
    }

    /// Seed bundled templates into the user directory exactly once.
    ///
    /// Seeding fires only when the seeded marker is absent and the directory
    /// is empty. Afterwards the marker is written — including when the
    /// directory already held user content — so re-running provisioning
    /// never re-seeds or overwrites, even if the user later empties the
    /// directory.
    fn seed_user_templates(&self, layout: &DirectoryLayout) -> io::Result<()> {
        let marker = layout.user_templates_dir.join(SEEDED_MARKER);
        if marker.exists() {
            debug!("user templates already seeded, skipping");
            return Ok(());
        }

        if dir_is_empty(&layout.user_templates_dir)? {
            info!(
                from = %layout.bundled_templates_dir.display(),
                to = %layout.user_templates_dir.display(),
                "seeding user templates from bundled set"
            );
            copy_dir_recursive(&layout.bundled_templates_dir, &layout.user_templates_dir)?;
        } else {
            debug!("user templates directory already has content, recording as seeded");
        }

        fs::write(&marker, b"")?;
        Ok(())
    }
}

/// True when the directory contains no entries besides the seeded marker.
fn dir_is_empty(dir: &Path) -> io::Result<bool> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name() != SEEDED_MARKER {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Recursively copy the contents of `src` into `dest`.
fn copy_dir_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    if !dest.exists() {
        fs::create_dir_all(dest)?;
    }

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&src_path, &dest_path)?;
        } else {
            fs::copy(&src_path, &dest_path)?;
        }
    }
    Ok(())
}
