//! # radar
//!
//! Application layer around `radar-core`: the CLI, the HTTP API and the
//! loading of engine configuration from disk.

pub mod api;
pub mod cli;
pub mod settings;
