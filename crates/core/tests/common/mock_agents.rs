//! Mock agent implementations for deterministic testing.

use async_trait::async_trait;
use sp_core::agents::base::{Agent, AgentError, AgentEvent, AgentStream, StepRequest};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Answers every request with `"<step id> result"` (plus the feedback for
/// revisions) and records each request it receives.
#[derive(Clone, Default)]
pub struct RecordingAgent {
    requests: Arc<Mutex<Vec<StepRequest>>>,
    delay: Option<Duration>,
}

#[allow(dead_code)]
impl RecordingAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<StepRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Step ids of every request received so far, in order.
    pub fn step_ids(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| request.step.id)
            .collect()
    }
}

/// The text [`RecordingAgent`] returns for a request.
#[allow(dead_code)]
pub fn recorded_result(step_id: &str, feedback: Option<&str>) -> String {
    match feedback {
        Some(feedback) => format!("{} result (revised: {})", step_id, feedback),
        None => format!("{} result", step_id),
    }
}

#[async_trait]
impl Agent for RecordingAgent {
    async fn check_availability(&self) -> bool {
        true
    }

    async fn execute(&self, request: &StepRequest) -> Result<AgentStream, AgentError> {
        self.requests.lock().unwrap().push(request.clone());

        let result = recorded_result(&request.step.id, request.feedback.as_deref());
        let thought = format!("Working on {}", request.step.id);
        let delay = self.delay;

        let stream = async_stream::stream! {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            yield Ok(AgentEvent::Thought(thought));
            // Split in two to check that chunks are joined
            let middle = result.chars().count() / 2;
            yield Ok(AgentEvent::MessageChunk(result.chars().take(middle).collect()));
            yield Ok(AgentEvent::MessageChunk(result.chars().skip(middle).collect()));
            yield Ok(AgentEvent::Completed);
        };

        Ok(Box::pin(stream))
    }
}

/// Fails the step with the given id and succeeds on every other step.
#[allow(dead_code)]
pub struct FailingAgent {
    pub fail_on: String,
    pub error_message: String,
    pub inner: RecordingAgent,
    /// Only fail requests that carry revision feedback.
    pub revisions_only: bool,
}

#[allow(dead_code)]
impl FailingAgent {
    pub fn new(fail_on: &str, error_message: &str) -> Self {
        Self {
            fail_on: fail_on.to_string(),
            error_message: error_message.to_string(),
            inner: RecordingAgent::new(),
            revisions_only: false,
        }
    }

    /// Let the first run of the step succeed and fail its revision.
    pub fn on_revision(mut self) -> Self {
        self.revisions_only = true;
        self
    }
}

#[async_trait]
impl Agent for FailingAgent {
    async fn check_availability(&self) -> bool {
        true
    }

    async fn execute(&self, request: &StepRequest) -> Result<AgentStream, AgentError> {
        let is_revision = request.feedback.is_some();
        if request.step.id != self.fail_on || (self.revisions_only && !is_revision) {
            return self.inner.execute(request).await;
        }

        let error_message = self.error_message.clone();
        let stream = async_stream::stream! {
            yield Ok(AgentEvent::ToolCall("search_commentaries".to_string()));
            yield Err(AgentError::ApiError(error_message));
        };

        Ok(Box::pin(stream))
    }
}
