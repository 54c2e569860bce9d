//! manifest-merger CLI library exports for integration testing.
//!
//! This module exposes the command implementations, the terminal console and
//! the configuration loader behind the `manifest-merger` binary.

pub mod commands;
pub mod config;
pub mod console;
pub mod errors;
