//! CLI subcommand implementations.

pub mod config;
pub mod device;
pub mod event;
