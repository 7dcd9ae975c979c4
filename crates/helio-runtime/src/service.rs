//! The engine service facade.
//!
//! [`EngineService`] is the one value the UI/IPC boundary talks to. It is
//! built once at startup from explicit environment facts and committed
//! settings — no ambient globals — and owns the resolved engine handle, the
//! directory layout, and the single-flight guard that keeps at most one
//! engine request in flight.
//!
//! The service stays constructible when the engine cannot be located: the
//! application remains interactive and every engine-dependent operation
//! independently reports the stored initialization failure.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use helio_core::paths::{AppPaths, EnvironmentFacts};
use helio_core::platform::PlatformProfile;
use helio_core::settings::UserSettings;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::executor::{CommandExecutor, EngineRequest, EngineResponse};
use crate::locator::{EngineHandle, EngineLocator};
use crate::provision::{DirectoryLayout, DirectoryProvisioner};
use crate::verify::{EngineVerifier, VerificationReport};

/// Result of a dependency check, passed through to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyReport {
    pub available: bool,
    /// Interpreter version string, or `"bundled"` for a self-contained
    /// engine.
    pub version: Option<String>,
    /// Package name to install when `available` is false.
    pub missing: Option<String>,
}

/// Facade over the orchestration components, exposed to the UI boundary.
pub struct EngineService {
    paths: AppPaths,
    profile: PlatformProfile,
    layout: DirectoryLayout,
    executor: CommandExecutor,
    handle: Option<EngineHandle>,
    init_error: Option<EngineError>,
    /// Single-flight guard: at most one engine request in flight; later
    /// callers queue here.
    flight: Mutex<()>,
}

impl EngineService {
    /// Compose the service: resolve paths, provision directories, and locate
    /// the engine.
    ///
    /// Settings must already be committed (first-run setup is the caller's
    /// job). A missing engine does not fail bootstrap — the failure is
    /// stored and re-reported by each engine-dependent operation. Only path
    /// resolution itself is fatal here.
    pub fn bootstrap(facts: &EnvironmentFacts, settings: &UserSettings) -> EngineResult<Self> {
        let paths =
            AppPaths::resolve(facts).map_err(|e| EngineError::Configuration(e.to_string()))?;
        let layout = DirectoryLayout::new(&paths, settings);

        DirectoryProvisioner.provision(&layout);

        let locator = EngineLocator::new(&paths, &facts.profile, facts.mode);
        let (handle, init_error) = match locator.resolve() {
            Ok(handle) => {
                info!(path = %handle.path.display(), origin = ?handle.origin, "engine resolved");
                (Some(handle), None)
            }
            Err(e) => {
                warn!("engine resolution failed: {e}");
                (None, Some(e))
            }
        };

        let executor = CommandExecutor::new(paths.clone(), facts.profile.clone());

        Ok(Self {
            paths,
            profile: facts.profile.clone(),
            layout,
            executor,
            handle,
            init_error,
            flight: Mutex::new(()),
        })
    }

    /// Build a service directly from parts. Used by tests and by embedders
    /// that resolve paths themselves.
    #[must_use]
    pub fn from_parts(
        paths: AppPaths,
        profile: PlatformProfile,
        layout: DirectoryLayout,
        executor: CommandExecutor,
        handle: Option<EngineHandle>,
    ) -> Self {
        Self {
            paths,
            profile,
            layout,
            executor,
            handle,
            init_error: None,
            flight: Mutex::new(()),
        }
    }

    /// Whether an engine handle was established. The only engine state the
    /// UI ever sees.
    #[must_use]
    pub const fn ready(&self) -> bool {
        self.handle.is_some()
    }

    /// The initialization failure, when resolution failed.
    #[must_use]
    pub const fn init_error(&self) -> Option<&EngineError> {
        self.init_error.as_ref()
    }

    /// Resolved roots, for diagnostics display.
    #[must_use]
    pub const fn paths(&self) -> &AppPaths {
        &self.paths
    }

    /// Provisioned directory layout.
    #[must_use]
    pub const fn layout(&self) -> &DirectoryLayout {
        &self.layout
    }

    /// Platform facts the service was built with.
    #[must_use]
    pub const fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    fn handle(&self) -> EngineResult<&EngineHandle> {
        self.handle.as_ref().ok_or_else(|| match &self.init_error {
            Some(EngineError::Initialization { searched, hint }) => EngineError::Initialization {
                searched: searched.clone(),
                hint: hint.clone(),
            },
            _ => EngineError::Spawn("engine was not initialized".into()),
        })
    }

    /// Run the advisory verification probe and record the result on the
    /// handle. Returns `None` when no handle was established.
    pub async fn verify_engine(&mut self, timeout: Duration) -> Option<VerificationReport> {
        let handle = self.handle.as_ref()?;
        let report = EngineVerifier::with_timeout(timeout)
            .verify(handle, &self.layout)
            .await;

        if let Some(handle) = self.handle.as_mut() {
            handle.verified = report.verified;
        }
        Some(report)
    }

    /// Execute an arbitrary engine command. One process spawn per call; at
    /// most one in flight across the whole service.
    pub async fn run_command(&self, command: &str, args: Vec<String>) -> EngineResponse {
        let handle = self.handle()?;
        let request = EngineRequest::new(command, args);

        let _in_flight = self.flight.lock().await;
        self.executor.execute(&request, handle, &self.layout).await
    }

    /// List available templates, user directory shadowing bundled.
    pub async fn list_templates(&self) -> EngineResult<Vec<String>> {
        let payload = self.run_command("list-templates", vec![]).await?;

        let templates = payload
            .get("templates")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(templates)
    }

    /// Compress an image against a template into a dated text message in the
    /// output directory. Returns the payload and the output path.
    pub async fn compress(
        &self,
        image_path: &str,
        template_name: &str,
        dtg: &str,
    ) -> EngineResult<(Value, PathBuf)> {
        let output_path = self.layout.output_dir.join(format!("{template_name}_{dtg}.txt"));

        let payload = self
            .run_command(
                "compress",
                vec![
                    image_path.to_string(),
                    template_name.to_string(),
                    dtg.to_string(),
                    output_path.to_string_lossy().into_owned(),
                ],
            )
            .await?;

        Ok((payload, output_path))
    }

    /// Decompress a message file back into an image in the output
    /// directory.
    pub async fn decompress(
        &self,
        message_path: &str,
        template_name: &str,
    ) -> EngineResult<(Value, PathBuf)> {
        let output_path = self
            .layout
            .output_dir
            .join(format!("decoded_{}.gif", Utc::now().timestamp_millis()));

        let payload = self
            .run_command(
                "decompress",
                vec![
                    message_path.to_string(),
                    output_path.to_string_lossy().into_owned(),
                    template_name.to_string(),
                ],
            )
            .await?;

        Ok((payload, output_path))
    }

    /// Persist pasted text so file-oriented engine commands can consume it.
    pub fn save_scratch_message(&self, text: &str) -> EngineResult<PathBuf> {
        if !self.layout.output_dir.exists() {
            std::fs::create_dir_all(&self.layout.output_dir)
                .map_err(|e| EngineError::Configuration(e.to_string()))?;
        }

        let path = self
            .layout
            .output_dir
            .join(format!("scratch_message_{}.txt", Utc::now().timestamp_millis()));
        std::fs::write(&path, text).map_err(|e| EngineError::Configuration(e.to_string()))?;
        Ok(path)
    }

    /// Check whether the engine's runtime dependencies are satisfied.
    ///
    /// A bundled engine carries everything it needs; a system interpreter is
    /// probed for its version and for the modules the engine imports.
    pub async fn check_dependencies(&self) -> EngineResult<DependencyReport> {
        let handle = self.handle()?;

        if handle.is_bundled() {
            return Ok(DependencyReport {
                available: true,
                version: Some("bundled".into()),
                missing: None,
            });
        }

        let Some(version) = interpreter_version(&handle.path).await else {
            return Ok(DependencyReport {
                available: false,
                version: None,
                missing: Some("python".into()),
            });
        };

        match probe_modules(&handle.path).await {
            Ok(()) => Ok(DependencyReport {
                available: true,
                version: Some(version),
                missing: None,
            }),
            Err(missing) => Ok(DependencyReport {
                available: false,
                version: Some(version),
                missing: Some(missing),
            }),
        }
    }
}

/// Imports the engine's runtime needs; the failing module maps to the
/// package name the user should install.
const MODULE_PROBE: &str = "import cv2, numpy, imageio, yaml; print('OK')";

async fn interpreter_version(interpreter: &std::path::Path) -> Option<String> {
    let output = tokio::process::Command::new(interpreter)
        .arg("--version")
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }

    // Older interpreters print the version to stderr.
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.is_empty() { None } else { Some(stderr) }
    } else {
        Some(stdout)
    }
}

async fn probe_modules(interpreter: &std::path::Path) -> Result<(), String> {
    let output = tokio::process::Command::new(interpreter)
        .arg("-c")
        .arg(MODULE_PROBE)
        .output()
        .await
        .map_err(|e| e.to_string())?;

    if output.status.success() && String::from_utf8_lossy(&output.stdout).contains("OK") {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(missing_package_for(&stderr).to_string())
}

/// Map an import failure to the installable package name.
fn missing_package_for(stderr: &str) -> &'static str {
    if stderr.contains("cv2") {
        "opencv-python"
    } else if stderr.contains("numpy") {
        "numpy"
    } else if stderr.contains("imageio") {
        "imageio"
    } else if stderr.contains("yaml") {
        "pyyaml"
    } else {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_package_mapping_covers_known_modules() {
        assert_eq!(
            missing_package_for("ModuleNotFoundError: No module named 'cv2'"),
            "opencv-python"
        );
        assert_eq!(
            missing_package_for("ModuleNotFoundError: No module named 'yaml'"),
            "pyyaml"
        );
        assert_eq!(missing_package_for("something else entirely"), "unknown");
    }
}
