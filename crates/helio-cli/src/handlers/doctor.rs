//! Doctor command handler.
//!
//! Walks the full startup sequence and reports each stage instead of
//! aborting on the first failure: resolution, the verification probe, and
//! the runtime dependency check.

use anyhow::Result;

use helio_core::settings::UserSettings;
use helio_runtime::verify::DEFAULT_VERIFY_TIMEOUT;
use helio_runtime::{EngineService, VerificationOutcome, VerificationReport};

use crate::bootstrap::open_store;

/// Diagnose the engine installation.
pub async fn execute() -> Result<()> {
    let (facts, paths, store) = open_store()?;
    let settings = store
        .load()
        .unwrap_or_else(|| UserSettings::defaults(&paths.exe_root));

    let mut service = EngineService::bootstrap(&facts, &settings)?;

    if let Some(error) = service.init_error() {
        println!("engine:       NOT FOUND");
        println!();
        println!("{error}");
        println!();
        println!("{}", VerificationReport::troubleshooting(facts.profile.os));
        return Ok(());
    }
    println!("engine:       ok");

    match service.verify_engine(DEFAULT_VERIFY_TIMEOUT).await {
        Some(report) if report.verified => println!("verification: ok"),
        Some(report) => {
            println!("verification: FAILED");
            match report.outcome {
                VerificationOutcome::EngineFailure {
                    code,
                    stdout,
                    stderr,
                } => {
                    println!("  exit code: {code:?}");
                    if !stderr.trim().is_empty() {
                        println!("  stderr: {}", stderr.trim());
                    }
                    if !stdout.trim().is_empty() {
                        println!("  stdout: {}", stdout.trim());
                    }
                }
                VerificationOutcome::TimedOut { elapsed } => {
                    println!("  probe timed out after {elapsed:?}");
                }
                VerificationOutcome::SpawnFailed(reason) => {
                    println!("  failed to start: {reason}");
                }
                VerificationOutcome::Passed => {}
            }
            println!();
            println!("{}", VerificationReport::troubleshooting(facts.profile.os));
        }
        None => println!("verification: skipped (no engine)"),
    }

    let report = service.check_dependencies().await?;
    if report.available {
        println!(
            "dependencies: ok ({})",
            report.version.as_deref().unwrap_or("unknown")
        );
    } else {
        println!("dependencies: MISSING");
        if let Some(package) = report.missing {
            println!("  install: {package}");
        }
    }

    Ok(())
}
