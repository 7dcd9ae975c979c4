//! Advisory engine verification.
//!
//! A lightweight handshake that confirms the resolved engine actually starts
//! and responds before the first real workload. Verification only downgrades
//! confidence: a failed probe never blocks the application by itself — the
//! probe can fail in environments where the real commands still succeed, so
//! the caller surfaces the report and lets the user choose to continue.

use std::process::Stdio;
use std::time::{Duration, Instant};

use helio_core::platform::HostOs;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::executor::{ENV_BUNDLED_TEMPLATES, ENV_OUTPUT_DIR, ENV_USER_TEMPLATES};
use crate::locator::EngineHandle;
use crate::provision::DirectoryLayout;

/// Generous bound: first-run shared-library extraction on a slow disk can
/// take a while, and a timeout here is advisory anyway.
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(30);

/// What happened when the probe ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Probe exited 0.
    Passed,
    /// Probe ran but exited non-zero.
    EngineFailure {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// Probe did not finish inside the bound and the child was killed.
    /// Distinct from a crash: it may just be a slow environment.
    TimedOut { elapsed: Duration },
    /// The executable could not be launched at all.
    SpawnFailed(String),
}

/// Result of a verification probe, for user-facing display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub verified: bool,
    pub outcome: VerificationOutcome,
}

impl VerificationReport {
    /// Platform-specific remediation text for a failed verification.
    #[must_use]
    pub fn troubleshooting(os: HostOs) -> &'static str {
        match os {
            HostOs::Windows => {
                "Troubleshooting:\n\
                 1. Install the Visual C++ Redistributable 2015-2022 (x64)\n\
                 2. Check antivirus/firewall settings\n\
                 3. Try running as administrator\n\
                 4. Reinstall Heliograph to a different location"
            }
            HostOs::MacOs => {
                "Troubleshooting:\n\
                 1. Check Security & Privacy settings\n\
                 2. Right-click Heliograph and select \"Open\" to bypass Gatekeeper\n\
                 3. Check antivirus/firewall settings\n\
                 4. Reinstall Heliograph into your Applications folder"
            }
            HostOs::Linux => {
                "Troubleshooting:\n\
                 1. Make sure the binary has execute permissions (chmod +x)\n\
                 2. Check that FUSE is installed if running from an AppImage\n\
                 3. Check system logs: journalctl -xe"
            }
        }
    }
}

/// Spawns the resolved engine with a minimal, side-effect-free command and
/// classifies the outcome.
#[derive(Debug)]
pub struct EngineVerifier {
    probe_timeout: Duration,
}

impl Default for EngineVerifier {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_VERIFY_TIMEOUT,
        }
    }
}

impl EngineVerifier {
    /// Verifier with a custom probe timeout (tests use a short one).
    #[must_use]
    pub const fn with_timeout(probe_timeout: Duration) -> Self {
        Self { probe_timeout }
    }

    /// Run the handshake probe.
    ///
    /// A bundled engine gets its own `list-templates` introspection command
    /// (with the template env vars it needs); a system interpreter gets
    /// `--version`. The working directory is the engine's own directory so
    /// shared-library discovery works. The child is killed if the bound
    /// elapses.
    pub async fn verify(
        &self,
        handle: &EngineHandle,
        layout: &DirectoryLayout,
    ) -> VerificationReport {
        let mut cmd = Command::new(&handle.path);

        if handle.is_bundled() {
            cmd.arg("list-templates")
                .env(ENV_USER_TEMPLATES, &layout.user_templates_dir)
                .env(ENV_BUNDLED_TEMPLATES, &layout.bundled_templates_dir)
                .env(ENV_OUTPUT_DIR, &layout.output_dir);
        } else {
            cmd.arg("--version");
        }

        // Bare interpreter names ("python3") are resolved via PATH and have
        // no meaningful parent directory.
        if let Some(dir) = handle.path.parent()
            && !dir.as_os_str().is_empty()
        {
            cmd.current_dir(dir);
        }

        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!(path = %handle.path.display(), "running verification probe");
        let started = Instant::now();

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("verification probe failed to spawn: {e}");
                return VerificationReport {
                    verified: false,
                    outcome: VerificationOutcome::SpawnFailed(e.to_string()),
                };
            }
        };

        match timeout(self.probe_timeout, child.wait_with_output()).await {
            Ok(Ok(output)) if output.status.success() => {
                info!("engine verification passed");
                VerificationReport {
                    verified: true,
                    outcome: VerificationOutcome::Passed,
                }
            }
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                warn!(code = ?output.status.code(), "engine verification failed");
                VerificationReport {
                    verified: false,
                    outcome: VerificationOutcome::EngineFailure {
                        code: output.status.code(),
                        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                        stderr,
                    },
                }
            }
            Ok(Err(e)) => VerificationReport {
                verified: false,
                outcome: VerificationOutcome::SpawnFailed(e.to_string()),
            },
            Err(_) => {
                // The future owning the child was dropped; kill_on_drop
                // reaps the process, so no zombie survives the timeout.
                let elapsed = started.elapsed();
                warn!(?elapsed, "engine verification timed out");
                VerificationReport {
                    verified: false,
                    outcome: VerificationOutcome::TimedOut { elapsed },
                }
            }
        }
    }
}
