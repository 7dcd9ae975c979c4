//! End-to-end bootstrap: resolve paths, provision directories, locate the
//! engine, and execute a command through the composed service.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use helio_core::paths::{AppPaths, EnvironmentFacts};
use helio_core::platform::{HostOs, InstallationMode, PlatformProfile};
use helio_core::settings::UserSettings;
use helio_runtime::{EngineService, SettingsStore};
use tempfile::tempdir;

/// Packaged Linux layout: executable and resources side by side, engine
/// binary already at the preferred location.
fn packaged_facts(root: &Path) -> EnvironmentFacts {
    let exe_dir = root.join("app");
    fs::create_dir_all(&exe_dir).unwrap();

    EnvironmentFacts {
        mode: InstallationMode::Packaged,
        profile: PlatformProfile::for_os(HostOs::Linux),
        host_exe: exe_dir.join("heliograph"),
        cwd: root.to_path_buf(),
        data_local_dir: Some(root.join("data")),
        data_dir_override: None,
    }
}

fn install_fake_engine(exe_root: &Path, body: &str) {
    let path = exe_root.join("helio-engine");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

#[tokio::test]
async fn bootstrap_provisions_and_executes() {
    let dir = tempdir().unwrap();
    let facts = packaged_facts(dir.path());
    let paths = AppPaths::resolve(&facts).unwrap();

    // Bundled templates the provisioner should seed from.
    let bundled = paths.bundled_templates_dir();
    fs::create_dir_all(&bundled).unwrap();
    fs::write(bundled.join("alpha.yaml"), "shape: alpha").unwrap();

    install_fake_engine(
        &paths.exe_root,
        r#"echo '{"status":"ok","templates":["alpha"]}'"#,
    );

    let settings = UserSettings::defaults(&paths.exe_root);
    let service = EngineService::bootstrap(&facts, &settings).unwrap();

    assert!(service.ready());
    assert!(service.init_error().is_none());

    // Provisioning created the user directories and seeded templates.
    assert!(settings.output_dir.is_dir());
    assert!(settings.templates_dir.join("alpha.yaml").is_file());

    let templates = service.list_templates().await.unwrap();
    assert_eq!(templates, vec!["alpha"]);
}

#[tokio::test]
async fn bootstrap_survives_missing_engine() {
    let dir = tempdir().unwrap();
    let facts = packaged_facts(dir.path());

    let paths = AppPaths::resolve(&facts).unwrap();
    let settings = UserSettings::defaults(&paths.exe_root);

    // No engine installed anywhere.
    let service = EngineService::bootstrap(&facts, &settings).unwrap();

    assert!(!service.ready());
    assert!(service.init_error().is_some());
    assert!(service.list_templates().await.is_err());
}

#[tokio::test]
async fn settings_round_trip_through_resolved_paths() {
    let dir = tempdir().unwrap();
    let facts = packaged_facts(dir.path());
    let paths = AppPaths::resolve(&facts).unwrap();

    let store = SettingsStore::new(paths.settings_file());
    assert!(store.is_first_run());

    let settings = UserSettings::defaults(&paths.exe_root);
    store.save(&settings).unwrap();

    assert!(!store.is_first_run());
    assert_eq!(store.load().unwrap(), settings);
}

#[tokio::test]
async fn relocated_engine_lands_at_preferred_location() {
    let dir = tempdir().unwrap();
    let facts = packaged_facts(dir.path());
    let paths = AppPaths::resolve(&facts).unwrap();

    // Engine only present in the install tree, not next to the executable.
    fs::create_dir_all(&paths.install_root).unwrap();
    let stray = paths.install_root.join("helio-engine");
    fs::write(&stray, "#!/bin/sh\necho '{\"status\":\"ok\"}'\n").unwrap();
    fs::set_permissions(&stray, fs::Permissions::from_mode(0o755)).unwrap();

    let settings = UserSettings::defaults(&paths.exe_root);
    let service = EngineService::bootstrap(&facts, &settings).unwrap();

    assert!(service.ready());
    assert!(paths.exe_root.join("helio-engine").is_file());

    // A second bootstrap finds the relocated copy directly.
    let service2 = EngineService::bootstrap(&facts, &settings).unwrap();
    assert!(service2.ready());
    drop(service);
}
