//! Engine executable location and self-healing relocation.
//!
//! In packaged mode the engine binary may have been laid down in several
//! places depending on installer version; the locator checks an ordered list
//! of candidate locations and, when the binary is found anywhere other than
//! the preferred location next to the host executable, copies it there. The
//! engine extracts auxiliary shared libraries relative to its own path at
//! first run, and the directory next to the host executable is the one spot
//! the installer guarantees to be writable — a versioned resource tree is
//! not. The copy is a one-time migration: later resolutions short-circuit on
//! the preferred-location check.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use helio_core::paths::AppPaths;
use helio_core::platform::{InstallationMode, PlatformProfile};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};

/// How the resolved engine executable came to be at its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineOrigin {
    /// Self-contained bundled executable, found at (or already migrated to)
    /// the preferred location.
    Bundled,
    /// System-installed interpreter, used in unpacked mode.
    System,
    /// Bundled executable that was just copied to the preferred location.
    Relocated,
}

/// The resolved engine executable. Exactly one handle is active per process
/// lifetime; `verified` is flipped by the verifier, never by the locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineHandle {
    pub path: PathBuf,
    pub origin: EngineOrigin,
    pub verified: bool,
}

impl EngineHandle {
    /// True when the handle points at a self-contained bundled executable
    /// rather than a system interpreter.
    #[must_use]
    pub const fn is_bundled(&self) -> bool {
        !matches!(self.origin, EngineOrigin::System)
    }
}

/// Candidate bundle locations, in search order. Each is a pure function from
/// resolved paths to one location; the first that exists on disk wins.
type Candidate = fn(&AppPaths, &PlatformProfile) -> PathBuf;

const CANDIDATES: &[Candidate] = &[
    // Root of the unpacked resource tree.
    |paths, profile| paths.install_root.join(profile.engine_executable_name),
    // Named subdirectory some installer versions used.
    |paths, profile| {
        paths
            .install_root
            .join("engine-dist")
            .join(profile.engine_executable_name)
    },
    // One level above the resource tree.
    |paths, profile| {
        paths
            .install_root
            .parent()
            .unwrap_or(&paths.install_root)
            .join(profile.engine_executable_name)
    },
];

/// Resolves the on-disk engine executable for one process lifetime.
#[derive(Debug)]
pub struct EngineLocator<'a> {
    paths: &'a AppPaths,
    profile: &'a PlatformProfile,
    mode: InstallationMode,
}

impl<'a> EngineLocator<'a> {
    #[must_use]
    pub const fn new(
        paths: &'a AppPaths,
        profile: &'a PlatformProfile,
        mode: InstallationMode,
    ) -> Self {
        Self {
            paths,
            profile,
            mode,
        }
    }

    /// The writable home for the engine binary, adjacent to the host
    /// executable.
    #[must_use]
    pub fn preferred_location(&self) -> PathBuf {
        self.paths.exe_root.join(self.profile.engine_executable_name)
    }

    /// Resolve the engine executable.
    ///
    /// Unpacked mode resolves to the platform's system interpreter without
    /// searching. Packaged mode checks the preferred location first, then
    /// the candidate list, relocating a non-preferred find. Returns an
    /// initialization error naming every searched location when nothing
    /// exists.
    pub fn resolve(&self) -> EngineResult<EngineHandle> {
        if self.mode == InstallationMode::Unpacked {
            debug!(
                interpreter = self.profile.interpreter_name,
                "unpacked mode, using system interpreter"
            );
            return Ok(EngineHandle {
                path: PathBuf::from(self.profile.interpreter_name),
                origin: EngineOrigin::System,
                verified: false,
            });
        }

        let preferred = self.preferred_location();
        if preferred.is_file() {
            debug!(path = %preferred.display(), "engine already at preferred location");
            return Ok(EngineHandle {
                path: preferred,
                origin: EngineOrigin::Bundled,
                verified: false,
            });
        }

        let mut searched = vec![preferred.clone()];
        for candidate_fn in CANDIDATES {
            let candidate = candidate_fn(self.paths, self.profile);
            if candidate.is_file() {
                info!(
                    found = %candidate.display(),
                    preferred = %preferred.display(),
                    "engine found outside preferred location, relocating"
                );
                return match relocate_to_preferred(&candidate, &preferred) {
                    Ok(path) => Ok(EngineHandle {
                        path,
                        origin: EngineOrigin::Relocated,
                        verified: false,
                    }),
                    Err(e) => {
                        // A non-writable exe root defeats relocation; run
                        // from where the binary was found rather than fail.
                        warn!(
                            "relocation failed ({e}), using engine in place at {}",
                            candidate.display()
                        );
                        Ok(EngineHandle {
                            path: candidate,
                            origin: EngineOrigin::Bundled,
                            verified: false,
                        })
                    }
                };
            }
            searched.push(candidate);
        }

        Err(EngineError::Initialization {
            hint: arch_mismatch_hint(&self.paths.exe_root),
            searched,
        })
    }
}

/// Copy the engine binary to the preferred location, preserving the
/// executable permission bit on POSIX systems.
///
/// Split out from the search so relocation integrity can be tested on its
/// own. Never called when the preferred location is already populated.
pub fn relocate_to_preferred(source: &Path, preferred: &Path) -> io::Result<PathBuf> {
    if let Some(parent) = preferred.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }

    fs::copy(source, preferred)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(source)?.permissions().mode();
        fs::set_permissions(preferred, fs::Permissions::from_mode(mode | 0o111))?;
    }

    Ok(preferred.to_path_buf())
}

/// Diagnostic hint for the architecture-mismatch edge case: a 64-bit build
/// installed under the 32-bit designated install tree. Detected
/// opportunistically at failure time, not as a resolution strategy.
fn arch_mismatch_hint(exe_root: &Path) -> String {
    let in_x86_tree = exe_root
        .to_string_lossy()
        .contains("Program Files (x86)");

    if in_x86_tree && cfg!(target_pointer_width = "64") {
        format!(
            "\nThe install path {} suggests a 32-bit location, but this is a \
             64-bit build. Reinstall to the 64-bit Program Files directory.",
            exe_root.display()
        )
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helio_core::platform::HostOs;
    use tempfile::tempdir;

    fn paths_in(root: &Path) -> AppPaths {
        AppPaths {
            install_root: root.join("resources"),
            exe_root: root.to_path_buf(),
            user_data_root: root.join("data"),
        }
    }

    fn profile() -> PlatformProfile {
        PlatformProfile::for_os(HostOs::Linux)
    }

    #[test]
    fn unpacked_mode_resolves_system_interpreter() {
        let dir = tempdir().unwrap();
        let paths = paths_in(dir.path());
        let profile = profile();
        let locator = EngineLocator::new(&paths, &profile, InstallationMode::Unpacked);

        let handle = locator.resolve().unwrap();
        assert_eq!(handle.origin, EngineOrigin::System);
        assert_eq!(handle.path, PathBuf::from("python3"));
        assert!(!handle.verified);
    }

    #[test]
    fn preferred_location_wins_without_copying() {
        let dir = tempdir().unwrap();
        let paths = paths_in(dir.path());
        let profile = profile();

        let preferred = paths.exe_root.join("helio-engine");
        fs::write(&preferred, b"preferred-bytes").unwrap();

        // A different binary in a candidate location must be ignored.
        fs::create_dir_all(&paths.install_root).unwrap();
        fs::write(paths.install_root.join("helio-engine"), b"other-bytes").unwrap();

        let locator = EngineLocator::new(&paths, &profile, InstallationMode::Packaged);
        let handle = locator.resolve().unwrap();

        assert_eq!(handle.origin, EngineOrigin::Bundled);
        assert_eq!(handle.path, preferred);
        assert_eq!(fs::read(&preferred).unwrap(), b"preferred-bytes");
    }

    #[test]
    fn secondary_candidate_is_relocated_byte_identical() {
        let dir = tempdir().unwrap();
        let paths = paths_in(dir.path());
        let profile = profile();

        let dist = paths.install_root.join("engine-dist");
        fs::create_dir_all(&dist).unwrap();
        let source = dist.join("helio-engine");
        fs::write(&source, b"engine-payload").unwrap();

        let locator = EngineLocator::new(&paths, &profile, InstallationMode::Packaged);
        let handle = locator.resolve().unwrap();

        assert_eq!(handle.origin, EngineOrigin::Relocated);
        assert_eq!(handle.path, paths.exe_root.join("helio-engine"));
        assert_eq!(fs::read(&handle.path).unwrap(), fs::read(&source).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn relocation_preserves_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let source = dir.path().join("src-engine");
        let preferred = dir.path().join("bin").join("helio-engine");
        fs::write(&source, b"#!/bin/sh\nexit 0").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o755)).unwrap();

        relocate_to_preferred(&source, &preferred).unwrap();

        let mode = fs::metadata(&preferred).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0, "exec bit must survive relocation");
    }

    #[test]
    fn second_resolve_short_circuits_after_relocation() {
        let dir = tempdir().unwrap();
        let paths = paths_in(dir.path());
        let profile = profile();

        fs::create_dir_all(&paths.install_root).unwrap();
        fs::write(paths.install_root.join("helio-engine"), b"payload").unwrap();

        let locator = EngineLocator::new(&paths, &profile, InstallationMode::Packaged);
        assert_eq!(locator.resolve().unwrap().origin, EngineOrigin::Relocated);
        assert_eq!(locator.resolve().unwrap().origin, EngineOrigin::Bundled);
    }

    #[test]
    fn missing_engine_reports_every_searched_location() {
        let dir = tempdir().unwrap();
        let paths = paths_in(dir.path());
        let profile = profile();

        let locator = EngineLocator::new(&paths, &profile, InstallationMode::Packaged);
        let err = locator.resolve().unwrap_err();

        match err {
            EngineError::Initialization { searched, .. } => {
                // Preferred plus the three candidates.
                assert_eq!(searched.len(), 4);
                assert_eq!(searched[0], paths.exe_root.join("helio-engine"));
            }
            other => panic!("expected Initialization, got {other:?}"),
        }
    }
}
