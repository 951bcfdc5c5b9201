//! # wu_app
//!
//! Shared plumbing for the workspace binaries: logging, configuration and
//! command-line handling.

pub mod cli;
pub mod config_loader;
pub mod tracing_setup;
