//! CLI library components for the `qml` tool.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod tables;
