//! Subcommand implementations.

pub mod comments;
pub mod config;
pub mod stream;
