//! Agent manager for resolving step roles to agents.
//!
//! The `AgentManager` is responsible for:
//! - Registering agents per role name (a step's `agent-name`)
//! - Falling back to a default agent for roles without a dedicated one
//! - Providing fallback logic when the chosen agent is unavailable

use crate::agents::base::{Agent, AgentError, AgentStream, StepRequest};
use std::collections::HashMap;
use std::sync::Arc;

/// Manages all registered agents and provides orchestration logic.
#[derive(Clone, Default)]
pub struct AgentManager {
    agents: HashMap<String, Arc<dyn Agent>>,
    default_agent: Option<Arc<dyn Agent>>,
    fallback_agent_name: Option<String>,
}

impl std::fmt::Debug for AgentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentManager")
            .field("agents", &self.agents.keys().collect::<Vec<_>>())
            .field("has_default_agent", &self.default_agent.is_some())
            .field("fallback_agent_name", &self.fallback_agent_name)
            .finish()
    }
}

impl AgentManager {
    /// Create a manager that sends every role to `default_agent`.
    pub fn new(default_agent: Arc<dyn Agent>) -> Self {
        Self {
            agents: HashMap::new(),
            default_agent: Some(default_agent),
            fallback_agent_name: None,
        }
    }

    /// Register a dedicated agent for one role.
    pub fn with_agent(mut self, role: impl Into<String>, agent: Arc<dyn Agent>) -> Self {
        self.agents.insert(role.into(), agent);
        self
    }

    /// Set the registered agent to use when the resolved agent is unavailable.
    pub fn with_fallback(mut self, role: impl Into<String>) -> Self {
        self.fallback_agent_name = Some(role.into());
        self
    }

    /// Get the agent registered for a role, or the default agent.
    pub fn get_agent(&self, role: &str) -> Option<Arc<dyn Agent>> {
        self.agents
            .get(role)
            .cloned()
            .or_else(|| self.default_agent.clone())
    }

    /// Execute a step request with the agent resolved from its role.
    ///
    /// # Behavior
    ///
    /// 1. Resolve the agent for `request.step.agent_name`
    /// 2. Check if it's available
    /// 3. If unavailable and a fallback is configured, try the fallback agent
    /// 4. Execute with the selected agent
    pub async fn execute(&self, request: &StepRequest) -> Result<AgentStream, AgentError> {
        let role = request.step.agent_name.as_str();

        let Some(agent) = self.get_agent(role) else {
            return Err(AgentError::NotAvailable(format!(
                "No agent registered for role '{}'",
                role
            )));
        };

        if agent.check_availability().await {
            return agent.execute(request).await;
        }

        if let Some(fallback_name) = &self.fallback_agent_name {
            if fallback_name != role {
                if let Some(fallback_agent) = self.agents.get(fallback_name) {
                    if fallback_agent.check_availability().await {
                        tracing::warn!(role, fallback = %fallback_name, "agent unavailable, using fallback");
                        return fallback_agent.execute(request).await;
                    }
                }
            }
        }

        Err(AgentError::NotAvailable(format!(
            "Agent for role '{}' is not available and no fallback succeeded",
            role
        )))
    }

    /// Check if a dedicated agent is registered for the role.
    pub fn has_agent(&self, role: &str) -> bool {
        self.agents.contains_key(role)
    }
}
