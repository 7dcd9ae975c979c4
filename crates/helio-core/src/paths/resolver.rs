//! Pure resolution of the three heliograph roots.
//!
//! [`EnvironmentFacts`] captures everything path math depends on (packaging
//! mode, platform profile, host executable path, working directory, data
//! directory, env overrides) in one impure `detect()` call. [`AppPaths`] is
//! then a deterministic, side-effect-free function of those facts — the same
//! facts always produce the same three roots, which is what the path tests
//! assert.

use std::env;
use std::path::{Path, PathBuf};

use super::error::PathError;
use crate::platform::{InstallationMode, PlatformProfile};

/// Directory name for heliograph's user data under the platform data dir.
const USER_DATA_DIR_NAME: &str = "heliograph";

/// Subdirectory of the install root holding bundled resources on
/// Windows/Linux packaged layouts. On macOS the bundle structure provides
/// `Contents/Resources` instead.
const RESOURCES_DIR_NAME: &str = "resources";

/// Environment facts captured once at startup.
///
/// Constructing this is the only impure step in path resolution; everything
/// downstream is a pure function of the captured values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentFacts {
    /// Packaged or unpacked.
    pub mode: InstallationMode,
    /// Platform profile for the host.
    pub profile: PlatformProfile,
    /// Absolute path of the host executable.
    pub host_exe: PathBuf,
    /// Working directory at startup (the project tree in unpacked mode).
    pub cwd: PathBuf,
    /// Platform local-data directory, if one exists.
    pub data_local_dir: Option<PathBuf>,
    /// `HELIO_DATA_DIR` override, if set.
    pub data_dir_override: Option<PathBuf>,
}

impl EnvironmentFacts {
    /// Capture the facts for the current process.
    pub fn detect() -> Result<Self, PathError> {
        let host_exe =
            env::current_exe().map_err(|e| PathError::NoHostExe(e.to_string()))?;
        let cwd = env::current_dir().map_err(|e| PathError::NoHostExe(e.to_string()))?;

        Ok(Self {
            mode: InstallationMode::detect(),
            profile: PlatformProfile::current(),
            host_exe,
            cwd,
            data_local_dir: dirs::data_local_dir(),
            data_dir_override: env::var_os("HELIO_DATA_DIR").map(PathBuf::from),
        })
    }
}

/// The three roots everything else is derived from.
///
/// - `install_root`: the read-only resource tree the installer laid down
///   (bundled templates, the engine script in unpacked mode)
/// - `exe_root`: the user-visible directory adjacent to the host executable;
///   writable by whoever installed the host executable, used as the engine's
///   working/extraction directory and the default home for templates/output
/// - `user_data_root`: per-user directory for the settings file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub install_root: PathBuf,
    pub exe_root: PathBuf,
    pub user_data_root: PathBuf,
}

impl AppPaths {
    /// Resolve all three roots from captured facts. Pure: no I/O.
    pub fn resolve(facts: &EnvironmentFacts) -> Result<Self, PathError> {
        let exe_dir = facts
            .host_exe
            .parent()
            .ok_or_else(|| {
                PathError::NoHostExe(format!(
                    "executable path has no parent: {}",
                    facts.host_exe.display()
                ))
            })?
            .to_path_buf();

        let (install_root, exe_root) = match facts.mode {
            InstallationMode::Unpacked => (facts.cwd.clone(), exe_dir),
            InstallationMode::Packaged => {
                let install_root = if facts.profile.bundle_parent_hops > 0 {
                    // macOS bundle: Contents/MacOS -> Contents/Resources
                    parent_hops(&exe_dir, 1).join("Resources")
                } else {
                    exe_dir.join(RESOURCES_DIR_NAME)
                };
                let exe_root = parent_hops(&exe_dir, facts.profile.bundle_parent_hops);
                (install_root, exe_root)
            }
        };

        let user_data_root = match &facts.data_dir_override {
            Some(path) => path.clone(),
            None => facts
                .data_local_dir
                .as_deref()
                .ok_or(PathError::NoDataDir)?
                .join(USER_DATA_DIR_NAME),
        };

        Ok(Self {
            install_root,
            exe_root,
            user_data_root,
        })
    }

    /// Bundled (read-only) templates directory inside the install root.
    #[must_use]
    pub fn bundled_templates_dir(&self) -> PathBuf {
        self.install_root.join("templates")
    }

    /// Engine script path used with a system interpreter in unpacked mode.
    #[must_use]
    pub fn engine_script_path(&self) -> PathBuf {
        self.install_root.join("engine").join("helio_core.py")
    }

    /// Path to the settings file.
    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.user_data_root.join("settings.json")
    }
}

/// Walk `hops` parent directories up from `path`, stopping at the root.
fn parent_hops(path: &Path, hops: usize) -> PathBuf {
    let mut current = path;
    for _ in 0..hops {
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    current.to_path_buf()
}
