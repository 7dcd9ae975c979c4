//! Core domain types for the heliograph shell.
//!
//! This crate holds everything the orchestration layer needs that does not
//! spawn processes: platform facts, installation mode, path resolution,
//! directory utilities, and the user settings domain type. No async, no
//! subprocess code — those live in `helio-runtime`.

pub mod paths;
pub mod platform;
pub mod settings;

pub use paths::{AppPaths, EnvironmentFacts, PathError};
pub use platform::{HostOs, InstallationMode, PlatformProfile};
pub use settings::{SettingsError, UserSettings};
