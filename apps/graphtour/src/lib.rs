//! # graphtour (app library)
//!
//! Command implementations and run configuration for the graphtour binary.
//! Exposed as a library so integration tests can drive the commands
//! without spawning a process.

pub mod cli;
pub mod config;
