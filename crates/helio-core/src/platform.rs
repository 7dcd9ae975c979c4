//! Platform and packaging facts, resolved once at process start.
//!
//! All OS-specific path math downstream is driven by the values in
//! [`PlatformProfile`] rather than scattered `cfg!` conditionals. The profile
//! is immutable after detection and passed by value to the resolvers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the shell runs from a finalized installation bundle or a raw
/// development tree. Set once at process start, immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallationMode {
    /// Running from an installed/packaged bundle.
    Packaged,
    /// Running from a development checkout.
    Unpacked,
}

impl InstallationMode {
    /// Detect the installation mode for the current process.
    ///
    /// Resolution order:
    /// 1. `HELIO_PACKAGED` environment variable (`1`/`true` forces packaged,
    ///    `0`/`false` forces unpacked) — used by packaging scripts and tests
    /// 2. Debug builds are assumed to run from the development tree
    /// 3. Release builds are assumed to be packaged
    #[must_use]
    pub fn detect() -> Self {
        if let Ok(value) = std::env::var("HELIO_PACKAGED") {
            return match value.trim() {
                "0" | "false" | "no" => Self::Unpacked,
                _ => Self::Packaged,
            };
        }

        if cfg!(debug_assertions) {
            Self::Unpacked
        } else {
            Self::Packaged
        }
    }

    /// True when running from a finalized bundle.
    #[must_use]
    pub const fn is_packaged(self) -> bool {
        matches!(self, Self::Packaged)
    }
}

/// Host operating system tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    Windows,
    MacOs,
    Linux,
}

impl HostOs {
    /// Detect the host OS of the current build target.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Linux => "linux",
        };
        write!(f, "{name}")
    }
}

/// Immutable platform facts consumed by path resolution and engine
/// invocation.
///
/// The macOS packaged layout differs from Windows/Linux by extra
/// parent-directory hops (the executable lives inside
/// `Name.app/Contents/MacOS/`); that difference is the named
/// `bundle_parent_hops` parameter here, not an inline conditional at each
/// call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProfile {
    /// Host operating system.
    pub os: HostOs,
    /// File name of the bundled engine executable.
    pub engine_executable_name: &'static str,
    /// Name of the system interpreter used in unpacked mode.
    pub interpreter_name: &'static str,
    /// Parent-directory hops from the host executable's directory up to the
    /// user-visible install directory in a packaged layout.
    pub bundle_parent_hops: usize,
    /// Whether the host process architecture can diverge from the hardware
    /// architecture, requiring an arch-selection wrapper for system
    /// interpreter invocations.
    pub arch_selection_required: bool,
}

impl PlatformProfile {
    /// Build the profile for a given OS.
    #[must_use]
    pub const fn for_os(os: HostOs) -> Self {
        match os {
            HostOs::Windows => Self {
                os,
                engine_executable_name: "helio-engine.exe",
                interpreter_name: "python",
                bundle_parent_hops: 0,
                arch_selection_required: false,
            },
            // Executable sits in Name.app/Contents/MacOS; the user-visible
            // install directory is the .app bundle's parent, two hops up.
            HostOs::MacOs => Self {
                os,
                engine_executable_name: "helio-engine",
                interpreter_name: "python3",
                bundle_parent_hops: 2,
                arch_selection_required: true,
            },
            HostOs::Linux => Self {
                os,
                engine_executable_name: "helio-engine",
                interpreter_name: "python3",
                bundle_parent_hops: 0,
                arch_selection_required: false,
            },
        }
    }

    /// Profile for the current host.
    #[must_use]
    pub const fn current() -> Self {
        Self::for_os(HostOs::current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_names_engine_per_os() {
        assert_eq!(
            PlatformProfile::for_os(HostOs::Windows).engine_executable_name,
            "helio-engine.exe"
        );
        assert_eq!(
            PlatformProfile::for_os(HostOs::Linux).engine_executable_name,
            "helio-engine"
        );
    }

    #[test]
    fn only_macos_needs_bundle_hops_and_arch_selection() {
        let mac = PlatformProfile::for_os(HostOs::MacOs);
        assert_eq!(mac.bundle_parent_hops, 2);
        assert!(mac.arch_selection_required);

        for os in [HostOs::Windows, HostOs::Linux] {
            let profile = PlatformProfile::for_os(os);
            assert_eq!(profile.bundle_parent_hops, 0);
            assert!(!profile.arch_selection_required);
        }
    }

    #[test]
    fn interpreter_is_python3_except_windows() {
        assert_eq!(
            PlatformProfile::for_os(HostOs::Windows).interpreter_name,
            "python"
        );
        assert_eq!(
            PlatformProfile::for_os(HostOs::MacOs).interpreter_name,
            "python3"
        );
    }

    #[test]
    fn current_mode_is_deterministic() {
        assert_eq!(InstallationMode::detect(), InstallationMode::detect());
    }
}
