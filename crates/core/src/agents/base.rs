//! Base Agent trait and supporting types.

use async_trait::async_trait;
use sp_protocol::session_models::PipelineInput;
use sp_protocol::step_models::StepDefinition;
use std::pin::Pin;
use thiserror::Error;
use tokio_stream::Stream;

/// Everything an agent receives for one step invocation.
#[derive(Debug, Clone)]
pub struct StepRequest {
    /// The step being executed.
    pub step: StepDefinition,

    /// Pipeline input, passed through unmodified.
    pub input: PipelineInput,

    /// Labelled results of all earlier completed steps.
    pub context: String,

    /// Reviewer instructions when the step is re-run after a revision request.
    pub feedback: Option<String>,
}

impl StepRequest {
    /// Create a request with empty context and no feedback.
    pub fn new(step: StepDefinition, input: PipelineInput) -> Self {
        Self {
            step,
            input,
            context: String::new(),
            feedback: None,
        }
    }

    pub fn with_context(mut self, context: String) -> Self {
        self.context = context;
        self
    }

    pub fn with_feedback(mut self, feedback: Option<String>) -> Self {
        self.feedback = feedback;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    Thought(String),
    ToolCall(String),
    MessageChunk(String),
    Completed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("Agent not available: {0}")]
    NotAvailable(String),
    #[error("API call failed: {0}")]
    ApiError(String),
    #[error("Stream parsing error: {0}")]
    StreamParseError(String),
    #[error("Execution failed: {0}")]
    ExecutionError(String),
}

pub type AgentStream = Pin<Box<dyn Stream<Item = Result<AgentEvent, AgentError>> + Send>>;

#[async_trait]
pub trait Agent: Send + Sync {
    async fn check_availability(&self) -> bool;
    async fn execute(&self, request: &StepRequest) -> Result<AgentStream, AgentError>;
}
