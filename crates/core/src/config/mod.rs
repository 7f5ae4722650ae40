//! Configuration loading and management.
//!
//! This module provides functionality to load and parse all configuration files
//! from the `.sermon-pipeline/` directory structure.

pub mod error;
pub mod loader;
pub mod models;

/// Name of the project configuration directory.
pub const CONFIG_DIR: &str = ".sermon-pipeline";
