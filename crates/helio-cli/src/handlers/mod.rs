//! Command handlers.
//!
//! Each handler takes the composed context (or the bare store, for commands
//! that must run before settings exist) and delegates to the engine service.

pub mod codec;
pub mod doctor;
pub mod paths;
pub mod run;
pub mod setup;
pub mod templates;
