//! Settings persistence.
//!
//! Loads and saves the user's directory configuration as pretty-printed JSON
//! under the user-data root. A missing or unparsable file is "no settings
//! yet" — it triggers the first-run flow instead of failing startup.

use std::fs;
use std::path::PathBuf;

use helio_core::settings::{SettingsError, UserSettings};
use tracing::{debug, warn};

/// File-backed store for [`UserSettings`].
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Create a store for the given settings file path
    /// (normally `AppPaths::settings_file()`).
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the settings file.
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load settings from disk.
    ///
    /// Returns `None` when the file is absent or cannot be parsed;
    /// corruption is logged and treated as "no settings".
    #[must_use]
    pub fn load(&self) -> Option<UserSettings> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) => {
                debug!(path = %self.path.display(), "no settings file: {e}");
                return None;
            }
        };

        match serde_json::from_str(&data) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    "settings file is corrupt, treating as first run: {e}"
                );
                None
            }
        }
    }

    /// Save settings to disk, creating the parent directory if missing.
    pub fn save(&self, settings: &UserSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| SettingsError::CreateDirFailed {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json).map_err(|e| SettingsError::WriteFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    /// True iff no settings exist or the stored value never cleared
    /// its `first_run` flag.
    #[must_use]
    pub fn is_first_run(&self) -> bool {
        match self.load() {
            Some(settings) => settings.first_run,
            None => true,
        }
    }
}
