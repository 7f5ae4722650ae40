//! Mock agent implementation for dry runs and testing.

use crate::agents::base::{Agent, AgentError, AgentEvent, AgentStream, StepRequest};
use async_trait::async_trait;

#[derive(Clone)]
enum Script {
    /// Replay the same events for every request.
    Fixed(Vec<Result<AgentEvent, AgentError>>),
    /// Write a short deterministic draft derived from the request.
    Draft,
}

#[derive(Clone)]
pub struct MockAgent {
    available: bool,
    script: Script,
}

impl MockAgent {
    pub fn new(available: bool, events: Vec<Result<AgentEvent, AgentError>>) -> Self {
        Self {
            available,
            script: Script::Fixed(events),
        }
    }

    pub fn success() -> Self {
        Self::new(
            true,
            vec![
                Ok(AgentEvent::Thought("Mock agent thinking".to_string())),
                Ok(AgentEvent::MessageChunk("Mock response".to_string())),
                Ok(AgentEvent::Completed),
            ],
        )
    }

    /// Offline agent that drafts markdown from the request. Used for dry runs.
    pub fn drafting() -> Self {
        Self {
            available: true,
            script: Script::Draft,
        }
    }

    pub fn unavailable() -> Self {
        Self::new(false, vec![])
    }

    pub fn failing() -> Self {
        Self::new(
            true,
            vec![
                Ok(AgentEvent::Thought("Starting...".to_string())),
                Err(AgentError::ExecutionError("Mock failure".to_string())),
            ],
        )
    }
}

fn draft(request: &StepRequest) -> String {
    let mut text = format!(
        "## {}\n\n{} for {}.\n\n- Theme: {}\n- Audience: {}\n- Earlier results consulted: {}\n",
        request.step.agent_name,
        request.step.description,
        request.input.passage,
        request.input.theme,
        request.input.audience,
        request.context.matches("\n\n[").count() + usize::from(!request.context.is_empty()),
    );
    if let Some(feedback) = &request.feedback {
        text.push_str(&format!("\nRevised per request: {feedback}\n"));
    }
    text
}

#[async_trait]
impl Agent for MockAgent {
    async fn check_availability(&self) -> bool {
        self.available
    }

    async fn execute(&self, request: &StepRequest) -> Result<AgentStream, AgentError> {
        if !self.available {
            return Err(AgentError::NotAvailable("Mock agent not available".to_string()));
        }

        let events = match &self.script {
            Script::Fixed(events) => events.clone(),
            Script::Draft => vec![
                Ok(AgentEvent::Thought(format!(
                    "Drafting {}",
                    request.step.agent_name
                ))),
                Ok(AgentEvent::MessageChunk(draft(request))),
                Ok(AgentEvent::Completed),
            ],
        };
        Ok(Box::pin(tokio_stream::iter(events)))
    }
}
