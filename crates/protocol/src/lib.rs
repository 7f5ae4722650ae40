//! # sp-protocol
//!
//! Protocol definitions and data models for the sermon pipeline.
//!
//! This crate defines all shared data structures used for:
//! - The immutable step catalog and per-run step state
//! - The session record, event log and pipeline input
//! - Configuration file parsing (TOML config, Markdown agent profiles)
//! - Communication between a presentation layer and the core
//!
//! ## Modules
//!
//! - [`step_models`]: Step definitions, phases, statuses and review stages
//! - [`session_models`]: Session state, log entries and pipeline input
//! - [`agent_models`]: Agent role profiles
//! - [`config_models`]: Global configuration from config.toml
//! - [`ipc`]: Operations and Events between presentation and core
//!
//! ## Design Principles
//!
//! - Minimal dependencies: serde, ts-rs, uuid and chrono
//! - TypeScript generation: All types derive `TS` for client compatibility
//! - Independent compilation: No dependencies on other workspace crates

pub mod agent_models;
pub mod config_models;
pub mod ipc;
pub mod session_models;
pub mod step_models;

// Re-export all public types for convenience
pub use agent_models::*;
pub use config_models::*;
pub use ipc::*;
pub use session_models::*;
pub use step_models::*;
