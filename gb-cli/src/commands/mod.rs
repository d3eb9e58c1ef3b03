//! Subcommand implementations.

pub mod config;
pub mod invoke;
pub mod store;
