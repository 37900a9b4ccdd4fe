//! MetricsKit CLI library.
//!
//! This crate provides the CLI interface for sending analytics events.

mod cli;
pub mod commands;
mod config;
pub mod device;

pub use cli::{Cli, Commands};
pub use config::Config;
