//! # sp-core
//!
//! Orchestration core for the sermon preparation pipeline.
//!
//! This crate provides:
//! - The step registry and its built-in sermon catalog
//! - The pipeline engine: a resumable run loop with human review gates
//! - Session state management behind a single-writer session manager
//! - Agent abstraction and adapters
//! - Markdown export, configuration loading and project initialization
//!
//! ## Modules
//!
//! - [`registry`]: Ordered step catalog
//! - [`engine`]: Run loop, context accumulation and quality scoring
//! - [`state`]: Session state functions and the session manager
//! - [`agents`]: Agent trait, prompt construction and adapters
//! - [`export`]: Report rendering and file export
//! - [`config`]: Configuration loading from `.sermon-pipeline/`
//! - [`init`]: `.sermon-pipeline/` scaffolding

pub mod agents;
pub mod config;
pub mod engine;
pub mod export;
pub mod init;
pub mod registry;
pub mod state;
