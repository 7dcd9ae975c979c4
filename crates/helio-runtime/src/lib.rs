//! Engine orchestration for the heliograph shell.
//!
//! This crate owns the runtime-resolution and subprocess layer: persisting
//! user settings, provisioning the directories the engine depends on,
//! locating the engine executable across packaged and unpacked layouts
//! (healing broken layouts by relocating the binary), verifying the engine
//! actually starts, and executing engine commands under a typed
//! request/response contract.
//!
//! The UI/IPC boundary consumes only [`EngineService`]; the individual
//! components are public for tests and the CLI's diagnostic commands.

pub mod error;
pub mod executor;
pub mod locator;
pub mod provision;
pub mod service;
pub mod settings_store;
pub mod verify;

pub use error::{EngineError, EngineResult};
pub use executor::{CommandExecutor, EngineRequest, EngineResponse};
pub use locator::{EngineHandle, EngineLocator, EngineOrigin};
pub use provision::{DirectoryLayout, DirectoryProvisioner};
pub use service::{DependencyReport, EngineService};
pub use settings_store::SettingsStore;
pub use verify::{EngineVerifier, VerificationOutcome, VerificationReport};
