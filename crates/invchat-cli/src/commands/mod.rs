//! CLI commands.

pub mod chat;
pub mod config;
