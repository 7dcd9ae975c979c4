//! CLI bootstrap, the composition root.
//!
//! This is the only place where the runtime pieces are wired together for
//! the CLI adapter: environment facts are captured, settings are loaded (or
//! created on first run), and the [`EngineService`] is composed. Command
//! handlers receive the finished context and delegate to it.

use anyhow::{Context, Result, bail};

use helio_core::paths::{AppPaths, EnvironmentFacts};
use helio_core::settings::UserSettings;
use helio_runtime::verify::DEFAULT_VERIFY_TIMEOUT;
use helio_runtime::{EngineService, SettingsStore, VerificationReport};

use crate::prompt::confirm;

/// Bootstrap options taken from global CLI flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct BootstrapOptions {
    /// Answer yes to all prompts (first-run defaults, verification
    /// failures).
    pub assume_yes: bool,
    /// Skip the startup verification probe.
    pub skip_verify: bool,
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    /// The engine service facade.
    pub service: EngineService,
    /// Settings persistence, kept for handlers that rewrite settings.
    pub store: SettingsStore,
    /// Environment facts the context was built from.
    pub facts: EnvironmentFacts,
}

impl CliContext {
    /// Access the engine service.
    pub const fn service(&self) -> &EngineService {
        &self.service
    }
}

/// Capture facts and open the settings store without composing the engine.
///
/// Used by `setup` and `paths`, which must work before any settings exist.
pub fn open_store() -> Result<(EnvironmentFacts, AppPaths, SettingsStore)> {
    let facts = EnvironmentFacts::detect().context("failed to detect environment")?;
    let paths = AppPaths::resolve(&facts).context("failed to resolve application paths")?;
    let store = SettingsStore::new(paths.settings_file());
    Ok((facts, paths, store))
}

/// Compose the full CLI context.
///
/// On first run the user is offered the default directories; declining
/// points them at `helio setup`. Engine verification runs once here and a
/// failed probe asks whether to continue.
pub async fn bootstrap(options: BootstrapOptions) -> Result<CliContext> {
    let (facts, paths, store) = open_store()?;

    let settings = match store.load() {
        Some(settings) => settings,
        None => {
            let defaults = UserSettings::defaults(&paths.exe_root);
            println!("No settings found at {}", store.path().display());
            println!("  templates: {}", defaults.templates_dir.display());
            println!("  output:    {}", defaults.output_dir.display());

            if !options.assume_yes && !confirm("Use these default directories?", true)? {
                bail!("run `helio setup` to choose directories");
            }

            store.save(&defaults).context("failed to write settings")?;
            defaults
        }
    };

    let mut service = EngineService::bootstrap(&facts, &settings)?;

    if let Some(error) = service.init_error() {
        bail!("{error}");
    }

    if !options.skip_verify {
        let report = service.verify_engine(DEFAULT_VERIFY_TIMEOUT).await;
        if let Some(report) = report
            && !report.verified
        {
            print_verification_failure(&report, &facts);
            if !options.assume_yes && !confirm("Continue anyway?", false)? {
                bail!("aborted after failed engine verification");
            }
        }
    }

    Ok(CliContext {
        service,
        store,
        facts,
    })
}

fn print_verification_failure(report: &VerificationReport, facts: &EnvironmentFacts) {
    eprintln!("Engine verification failed: {:?}", report.outcome);
    eprintln!();
    eprintln!("{}", VerificationReport::troubleshooting(facts.profile.os));
}
