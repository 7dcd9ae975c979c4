//! Error types for engine orchestration.
//!
//! One unified error enum for the whole subsystem keeps error plumbing out
//! of the orchestration modules. Variants map onto the failure taxonomy the
//! UI displays: initialization (engine cannot be located), spawn, protocol,
//! application, engine, timeout, and configuration failures.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while locating or invoking the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine executable could not be found anywhere. Fatal for
    /// engine-dependent features, not for the process.
    #[error("Engine executable not found. Searched:\n{}{hint}", format_searched(.searched))]
    Initialization {
        searched: Vec<PathBuf>,
        /// Extra diagnostic, e.g. an architecture-mismatch note.
        hint: String,
    },

    /// The process could not be started for a specific request.
    #[error("Failed to start engine process: {0}")]
    Spawn(String),

    /// The engine produced empty or malformed stdout.
    #[error("Engine protocol violation: {message}")]
    Protocol {
        message: String,
        /// Raw stdout, kept for diagnostics.
        raw: String,
    },

    /// The engine explicitly reported a logical failure
    /// (`{"status": "error", ...}`).
    #[error("{0}")]
    Application(String),

    /// The engine exited with a non-zero code.
    #[error("Engine error: {stderr}")]
    Engine { code: Option<i32>, stderr: String },

    /// The request exceeded its execution bound and the child was killed.
    #[error("Engine command timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// Settings or directory configuration could not be applied.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

fn format_searched(searched: &[PathBuf]) -> String {
    searched
        .iter()
        .map(|p| format!("  - {}\n", p.display()))
        .collect()
}

impl EngineError {
    /// Shorthand for a protocol violation without raw output.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
            raw: String::new(),
        }
    }
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialization_error_lists_searched_paths() {
        let err = EngineError::Initialization {
            searched: vec![PathBuf::from("/a/engine"), PathBuf::from("/b/engine")],
            hint: String::new(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/a/engine"));
        assert!(msg.contains("/b/engine"));
    }

    #[test]
    fn initialization_error_carries_hint() {
        let err = EngineError::Initialization {
            searched: vec![],
            hint: "install path suggests a 32-bit location".into(),
        };
        assert!(err.to_string().contains("32-bit"));
    }
}
