//! User settings domain type.
//!
//! Pure domain data with the on-disk JSON shape; persistence lives in
//! `helio-runtime`'s settings store.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// User-chosen directory configuration, committed exactly once before the
/// directory provisioner runs.
///
/// The on-disk form uses camelCase keys, matching the settings files written
/// by shipped builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    /// User-writable templates directory.
    pub templates_dir: PathBuf,
    /// Output directory for encoded/decoded artifacts.
    pub output_dir: PathBuf,
    /// True until first-run setup has committed a settings value.
    #[serde(default = "default_first_run")]
    pub first_run: bool,
}

const fn default_first_run() -> bool {
    true
}

impl UserSettings {
    /// Default directories under a base directory — the executable-adjacent
    /// root in shipped builds, so templates and output sit next to the
    /// user-visible executable.
    #[must_use]
    pub fn defaults(base_dir: &Path) -> Self {
        Self {
            templates_dir: base_dir.join("templates"),
            output_dir: base_dir.join("output"),
            first_run: false,
        }
    }
}

/// Settings persistence errors. Callers degrade to defaults rather than
/// treating these as fatal.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to create settings directory {path}: {reason}")]
    CreateDirFailed { path: PathBuf, reason: String },

    #[error("Failed to write settings file {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}
