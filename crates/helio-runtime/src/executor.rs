//! Per-request engine command execution.
//!
//! Each request maps to exactly one process spawn and one classified result;
//! there are no retries at this layer. The request contract is just
//! `(command, args)` — directory configuration travels in environment
//! variables so the argv shape never changes when configuration grows.

use std::process::Stdio;
use std::time::{Duration, Instant};

use helio_core::paths::AppPaths;
use helio_core::platform::PlatformProfile;
use serde_json::Value;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::locator::EngineHandle;
use crate::provision::DirectoryLayout;

/// Env var carrying the user templates directory (absolute).
pub const ENV_USER_TEMPLATES: &str = "HELIO_USER_TEMPLATES";
/// Env var carrying the bundled templates directory (absolute).
pub const ENV_BUNDLED_TEMPLATES: &str = "HELIO_BUNDLED_TEMPLATES";
/// Env var carrying the output directory (absolute).
pub const ENV_OUTPUT_DIR: &str = "HELIO_OUTPUT_DIR";

/// Bound on a single engine invocation; the child is killed when it
/// elapses. Codec runs on large inputs are slow, so this is deliberately
/// generous.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// One engine invocation: a command name and its ordered string arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRequest {
    pub command: String,
    pub args: Vec<String>,
}

impl EngineRequest {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

/// The classified result of one invocation: the parsed JSON payload on
/// success, a typed failure otherwise.
pub type EngineResponse = EngineResult<Value>;

/// Builds, spawns, and classifies engine invocations.
#[derive(Debug)]
pub struct CommandExecutor {
    paths: AppPaths,
    profile: PlatformProfile,
    request_timeout: Duration,
}

impl CommandExecutor {
    #[must_use]
    pub fn new(paths: AppPaths, profile: PlatformProfile) -> Self {
        Self {
            paths,
            profile,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request timeout (tests use a short one).
    #[must_use]
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Execute one request against the resolved engine.
    ///
    /// A bundled engine receives `[command, args...]` directly; a system
    /// interpreter is prefixed with the engine script path. The working
    /// directory is always the executable-adjacent root — resource lookups
    /// are defined relative to where the user-visible executable lives, and
    /// it doubles as the bundled runtime's extraction directory.
    pub async fn execute(
        &self,
        request: &EngineRequest,
        handle: &EngineHandle,
        layout: &DirectoryLayout,
    ) -> EngineResponse {
        let mut cmd = self.build_command(request, handle);

        cmd.current_dir(&self.paths.exe_root)
            .env(ENV_USER_TEMPLATES, &layout.user_templates_dir)
            .env(ENV_BUNDLED_TEMPLATES, &layout.bundled_templates_dir)
            .env(ENV_OUTPUT_DIR, &layout.output_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!(command = %request.command, "executing engine command");
        let started = Instant::now();

        let child = cmd.spawn().map_err(|e| EngineError::Spawn(e.to_string()))?;

        let output = match timeout(self.request_timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(EngineError::Spawn(e.to_string())),
            Err(_) => {
                warn!(command = %request.command, "engine command timed out, child killed");
                return Err(EngineError::Timeout {
                    elapsed: started.elapsed(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        classify_output(output.status.code(), output.status.success(), &stdout, &stderr)
    }

    /// Build the invocation for a request without spawning it.
    fn build_command(&self, request: &EngineRequest, handle: &EngineHandle) -> Command {
        if handle.is_bundled() {
            // Self-contained executable: command and arguments pass through
            // with no interpreter indirection.
            let mut cmd = Command::new(&handle.path);
            cmd.arg(&request.command).args(&request.args);
            return cmd;
        }

        let script = self.paths.engine_script_path();

        // The host process architecture can diverge from the hardware on
        // macOS (x86_64 shell on Apple Silicon); re-exec the interpreter
        // under the hardware architecture so its native libraries match.
        if self.profile.arch_selection_required {
            if let Some(arch) = hardware_arch() {
                debug!(%arch, "wrapping interpreter in arch selection");
                let mut cmd = Command::new("arch");
                cmd.arg(format!("-{arch}"))
                    .arg(&handle.path)
                    .arg(&script)
                    .arg(&request.command)
                    .args(&request.args);
                return cmd;
            }
            warn!("hardware architecture detection failed, using unwrapped interpreter");
        }

        let mut cmd = Command::new(&handle.path);
        cmd.arg(&script).arg(&request.command).args(&request.args);
        cmd
    }
}

/// Classify a finished invocation into the response contract.
///
/// The engine promises exactly one JSON document on stdout:
/// `{"status": "ok", ...}` or `{"status": "error", "error": "..."}`.
/// Anything else is a protocol violation. stderr is surfaced for
/// diagnostics, never parsed.
fn classify_output(
    code: Option<i32>,
    success: bool,
    stdout: &str,
    stderr: &str,
) -> EngineResponse {
    if !success {
        return Err(EngineError::Engine {
            code,
            stderr: stderr.trim().to_string(),
        });
    }

    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err(EngineError::protocol("no output from engine"));
    }

    let document: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(_) => {
            return Err(EngineError::Protocol {
                message: "malformed output".into(),
                raw: stdout.to_string(),
            });
        }
    };

    if document.get("status").and_then(Value::as_str) == Some("error") {
        let message = document
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("engine reported an error without a message")
            .to_string();
        return Err(EngineError::Application(message));
    }

    Ok(document)
}

/// Detect the hardware architecture via `uname -m`. `None` degrades to the
/// unwrapped invocation.
fn hardware_arch() -> Option<String> {
    let output = std::process::Command::new("uname").arg("-m").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let arch = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if arch.is_empty() { None } else { Some(arch) }
}


#[cfg(all(test, unix))]
mod process_tests {
    use super::*;
    use crate::locator::EngineOrigin;
    use helio_core::platform::HostOs;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::tempdir;

    fn executor_in(root: &Path) -> (CommandExecutor, DirectoryLayout) {
        let paths = AppPaths {
            install_root: root.join("resources"),
            exe_root: root.to_path_buf(),
            user_data_root: root.join("data"),
        };
        let layout = DirectoryLayout {
            bundled_templates_dir: root.join("resources").join("templates"),
            user_templates_dir: root.join("templates"),
            output_dir: root.join("output"),
        };
        let executor = CommandExecutor::new(paths, PlatformProfile::for_os(HostOs::Linux));
        (executor, layout)
    }

    fn fake_engine(root: &Path, script: &str) -> EngineHandle {
        let path = root.join("helio-engine");
        fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        EngineHandle {
            path,
            origin: EngineOrigin::Bundled,
            verified: true,
        }
    }

    #[tokio::test]
    async fn bundled_engine_receives_command_and_args_directly() {
        let dir = tempdir().unwrap();
        let (executor, layout) = executor_in(dir.path());
        // Echo back argv as the payload.
        let handle = fake_engine(
            dir.path(),
            r#"printf '{"status":"ok","argv":"%s %s"}' "$1" "$2""#,
        );

        let request = EngineRequest::new("compress", vec!["image.png".into()]);
        let payload = executor.execute(&request, &handle, &layout).await.unwrap();

        assert_eq!(payload["argv"], "compress image.png");
    }

    #[tokio::test]
    async fn layout_directories_arrive_via_environment() {
        let dir = tempdir().unwrap();
        let (executor, layout) = executor_in(dir.path());
        let handle = fake_engine(
            dir.path(),
            r#"printf '{"status":"ok","user":"%s","out":"%s"}' "$HELIO_USER_TEMPLATES" "$HELIO_OUTPUT_DIR""#,
        );

        let request = EngineRequest::new("list-templates", vec![]);
        let payload = executor.execute(&request, &handle, &layout).await.unwrap();

        assert_eq!(
            payload["user"],
            layout.user_templates_dir.to_string_lossy().as_ref()
        );
        assert_eq!(payload["out"], layout.output_dir.to_string_lossy().as_ref());
    }

    #[tokio::test]
    async fn working_directory_is_the_exe_root() {
        let dir = tempdir().unwrap();
        let (executor, layout) = executor_in(dir.path());
        let handle = fake_engine(dir.path(), r#"printf '{"status":"ok","cwd":"%s"}' "$PWD""#);

        let request = EngineRequest::new("whereami", vec![]);
        let payload = executor.execute(&request, &handle, &layout).await.unwrap();

        let cwd = payload["cwd"].as_str().unwrap();
        assert_eq!(
            fs::canonicalize(cwd).unwrap(),
            fs::canonicalize(dir.path()).unwrap()
        );
    }

    #[tokio::test]
    async fn hung_command_times_out_and_kills_the_child() {
        let dir = tempdir().unwrap();
        let (executor, layout) = executor_in(dir.path());
        let executor = executor.with_request_timeout(Duration::from_millis(200));
        let handle = fake_engine(dir.path(), "sleep 60");

        let request = EngineRequest::new("compress", vec![]);
        let started = Instant::now();
        let result = executor.execute(&request, &handle, &layout).await;

        assert!(matches!(result, Err(EngineError::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn missing_executable_is_a_spawn_error() {
        let dir = tempdir().unwrap();
        let (executor, layout) = executor_in(dir.path());
        let handle = EngineHandle {
            path: dir.path().join("does-not-exist"),
            origin: EngineOrigin::Bundled,
            verified: false,
        };

        let request = EngineRequest::new("compress", vec![]);
        let result = executor.execute(&request, &handle, &layout).await;

        assert!(matches!(result, Err(EngineError::Spawn(_))));
    }
}
