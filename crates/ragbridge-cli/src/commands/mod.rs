//! CLI command handlers

pub mod augment;
pub mod config;
pub mod retrieve;
