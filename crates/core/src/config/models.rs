//! Configuration models that aggregate all settings.
//!
//! This module provides the unified `AppConfig` structure that combines
//! global settings, agent role profiles, the default pipeline input and an
//! optional step catalog override into a single configuration object.

use crate::registry::{RegistryError, StepRegistry};
use sp_protocol::agent_models::AgentProfile;
use sp_protocol::config_models::GlobalConfig;
use sp_protocol::session_models::PipelineInput;
use sp_protocol::step_models::StepDefinition;

/// Unified application configuration loaded from `.sermon-pipeline/`.
///
/// This structure aggregates all configuration sources:
/// - `config.toml`: Global settings
/// - `agents/*.md`: Agent role profiles
/// - `input.toml`: Default pipeline input
/// - `pipeline.yaml`: Step catalog override
///
/// # Example
///
/// ```rust,no_run
/// use sp_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} agent profiles", config.agents.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Global settings from `config.toml`.
    pub global: GlobalConfig,

    /// All agent role profiles loaded from `agents/*.md`.
    pub agents: Vec<AgentProfile>,

    /// Default pipeline input from `input.toml`.
    pub input: Option<PipelineInput>,

    /// Step catalog from `pipeline.yaml`. The built-in catalog when absent.
    pub steps: Option<Vec<StepDefinition>>,
}

impl AppConfig {
    /// Build the step registry this configuration describes.
    pub fn registry(&self) -> Result<StepRegistry, RegistryError> {
        match &self.steps {
            Some(steps) => StepRegistry::new(steps.clone()),
            None => Ok(StepRegistry::sermon()),
        }
    }

    /// The configured pipeline input, or the built-in default.
    pub fn input_or_default(&self) -> PipelineInput {
        self.input.clone().unwrap_or_default()
    }
}
