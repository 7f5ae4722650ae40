//! Agent factory for building the agent manager from configuration.

use crate::agents::adapters::GeminiAdapter;
use crate::agents::adapters::MockAgent;
use crate::agents::agent_type::AgentType;
use crate::agents::base::Agent;
use crate::agents::manager::AgentManager;
use crate::agents::prompt::PromptBook;
use crate::config::models::AppConfig;
use anyhow::{bail, Result};
use std::sync::Arc;

/// Factory for creating agent instances based on configuration.
///
/// The factory determines which adapter to use based on the model name
/// and instantiates the appropriate agent type.
pub struct AgentFactory;

impl AgentFactory {
    /// Create a single agent for a model name.
    pub fn create(command: &str, model: &str, prompts: Arc<PromptBook>) -> Arc<dyn Agent> {
        match AgentType::from_model_name(model) {
            AgentType::Gemini => Arc::new(GeminiAdapter::new(
                command.to_string(),
                model.to_string(),
                prompts,
            )),
            AgentType::Mock => Arc::new(MockAgent::drafting()),
        }
    }

    /// Build the agent manager for a loaded configuration.
    ///
    /// The global `[agent]` settings produce the default agent. Every role
    /// profile with its own `model` gets a dedicated agent, and `fallback`
    /// names the dedicated agent used when the resolved one is unavailable.
    ///
    /// # Errors
    ///
    /// Returns an error if a profile sets an empty model name, or if the
    /// fallback role has no dedicated agent.
    pub fn build_manager(config: &AppConfig) -> Result<AgentManager> {
        let prompts = Arc::new(PromptBook::new(config.agents.clone()));
        let settings = &config.global.agent;

        let mut manager = AgentManager::new(Self::create(
            &settings.command,
            &settings.model,
            Arc::clone(&prompts),
        ));

        for profile in &config.agents {
            let Some(model) = &profile.model else {
                continue;
            };
            if model.trim().is_empty() {
                bail!("Agent profile '{}' sets an empty model", profile.name);
            }
            manager = manager.with_agent(
                profile.name.clone(),
                Self::create(&settings.command, model, Arc::clone(&prompts)),
            );
        }

        if let Some(fallback) = &settings.fallback {
            if !manager.has_agent(fallback) {
                bail!(
                    "Fallback agent '{}' must be a profile with its own model",
                    fallback
                );
            }
            manager = manager.with_fallback(fallback.clone());
        }

        Ok(manager)
    }
}
