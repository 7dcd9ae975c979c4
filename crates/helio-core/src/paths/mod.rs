//! Path resolution for heliograph directories.
//!
//! This module is the canonical source for the three roots the orchestration
//! layer depends on: the install root (read-only resource tree), the
//! executable-adjacent root (user-visible, writable), and the user-data root
//! (settings). Resolution itself is a pure function of captured environment
//! facts; all I/O happens in `EnvironmentFacts::detect`.

mod ensure;
mod error;
mod resolver;

pub use ensure::{DirectoryCreationStrategy, ensure_directory, verify_writable};
pub use error::PathError;
pub use resolver::{AppPaths, EnvironmentFacts};
