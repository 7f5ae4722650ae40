//! Initialization module for creating `.sermon-pipeline` directory structures.
//!
//! This module initializes a project by generating a `.sermon-pipeline/`
//! directory from embedded templates:
//! - Global configuration (`config.toml`)
//! - Default pipeline input (`input.toml`)
//! - Step catalog (`pipeline.yaml`)
//! - Agent role profiles (`agents/*.md`)
//!
//! # Example
//!
//! ```no_run
//! use sp_core::init::{InitOptions, generate_sermon_pipeline_structure};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = InitOptions {
//!     target_dir: PathBuf::from("."),
//!     force: false,
//!     minimal: false,
//! };
//!
//! generate_sermon_pipeline_structure(options).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod generator;
pub mod templates;

pub use error::{InitError, InitResult};
pub use generator::{generate_sermon_pipeline_structure, InitOptions};
pub use templates::{get_template, list_templates};
