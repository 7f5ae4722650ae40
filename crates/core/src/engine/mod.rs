//! Pipeline execution engine.
//!
//! The PipelineEngine owns one session and drives it through the step
//! registry. It executes steps strictly one at a time, suspends at review
//! gates, and resumes only through [`PipelineEngine::approve`] or
//! [`PipelineEngine::request_revision`].

pub mod context;
pub mod quality;

use crate::agents::base::{AgentError, AgentEvent, StepRequest};
use crate::agents::manager::AgentManager;
use crate::engine::context::accumulate_context;
use crate::engine::quality::{PlaceholderScorer, QualityScorer};
use crate::registry::StepRegistry;
use crate::state::session::{
    close_gate, complete_session, complete_step, create_session, fail_session, log_to_session,
    open_gate, reset_session, set_step_status, SessionSink,
};
use sp_protocol::config_models::PacingConfig;
use sp_protocol::ipc::{Event, GateResolution};
use sp_protocol::session_models::{LogKind, PipelineInput, SessionState};
use sp_protocol::step_models::{ReviewStage, StepStatus};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{mpsc::UnboundedSender, watch};
use tokio_stream::StreamExt;

const SYSTEM: &str = "System";
const ORCHESTRATOR: &str = "Orchestrator";
const USER: &str = "User";

/// Where a run stopped after an engine call returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunOutcome {
    /// Suspended until the gate is approved or a revision is requested.
    AwaitingGate {
        stage: ReviewStage,
        step_index: usize,
    },
    /// Every step finished.
    Completed { quality_score: f64 },
    /// The step failed and the run halted.
    Failed { step_index: usize },
}

/// Engine calls made in a state that does not allow them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("No pipeline run is in progress")]
    NotRunning,

    #[error("Review gate {0} is open and must be resolved first")]
    GateOpen(ReviewStage),

    #[error("No review gate is open")]
    NoOpenGate,

    #[error("Step index {index} is out of range for {len} steps")]
    StepOutOfRange { index: usize, len: usize },
}

/// The main pipeline execution engine.
pub struct PipelineEngine {
    registry: StepRegistry,
    agent_manager: AgentManager,
    scorer: Box<dyn QualityScorer>,
    pacing: PacingConfig,
    input: PipelineInput,
    session: SessionState,
    sink: SessionSink,
}

impl PipelineEngine {
    /// Create an idle engine for a registry.
    ///
    /// # Arguments
    ///
    /// * `registry` - The steps every run goes through
    /// * `agent_manager` - Resolves each step's role to an agent
    /// * `events_tx` - Channel for sending events to the presentation layer
    pub fn new(
        registry: StepRegistry,
        agent_manager: AgentManager,
        events_tx: UnboundedSender<Event>,
    ) -> Self {
        let session = create_session(&registry);
        Self {
            registry,
            agent_manager,
            scorer: Box::new(PlaceholderScorer),
            pacing: PacingConfig::default(),
            input: PipelineInput::default(),
            session,
            sink: SessionSink::new(events_tx),
        }
    }

    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_scorer(mut self, scorer: impl QualityScorer + 'static) -> Self {
        self.scorer = Box::new(scorer);
        self
    }

    /// Publish a copy of the session after every state change.
    pub fn with_snapshots(mut self, snapshots: watch::Sender<SessionState>) -> Self {
        self.sink = self.sink.with_snapshots(snapshots);
        self.publish();
        self
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn input(&self) -> &PipelineInput {
        &self.input
    }

    /// A sender for the engine's event channel.
    pub fn events_sender(&self) -> UnboundedSender<Event> {
        self.sink.events_sender()
    }

    /// Start a new run, discarding everything from the previous one.
    ///
    /// The run stops at the initial-approval gate before any agent is
    /// invoked.
    pub async fn start(&mut self, input: PipelineInput) -> Result<RunOutcome, EngineError> {
        self.input = input;
        reset_session(&mut self.session, &self.registry, &self.sink);
        self.log(SYSTEM, "Starting workflow. Initializing session...", LogKind::Info);
        tracing::info!(session = %self.session.id, steps = self.registry.len(), "pipeline started");

        pause(self.pacing.start_delay_ms).await;
        self.advance(0, None).await
    }

    /// Execute or gate the step at `index`, then keep going until the run
    /// suspends, completes or fails.
    ///
    /// # Errors
    ///
    /// Returns an error if no run is in progress, a gate is open, or `index`
    /// is past the end of the registry.
    pub async fn advance(
        &mut self,
        index: usize,
        feedback: Option<String>,
    ) -> Result<RunOutcome, EngineError> {
        if !self.session.is_processing {
            return Err(EngineError::NotRunning);
        }
        if let Some(stage) = self.session.hitl_stage {
            return Err(EngineError::GateOpen(stage));
        }
        if index > self.registry.len() {
            return Err(EngineError::StepOutOfRange {
                index,
                len: self.registry.len(),
            });
        }

        let mut index = index;
        let mut feedback = normalize_feedback(feedback);

        loop {
            if index >= self.registry.len() {
                return Ok(self.finish());
            }

            if index == 0 && feedback.is_none() && !self.session.initial_approved {
                self.log(
                    SYSTEM,
                    "User approval is required before the analysis phase.",
                    LogKind::Warning,
                );
                return Ok(self.suspend(ReviewStage::InitialApproval, 0));
            }

            if let Err(error) = self.execute_step(index, feedback.take()).await {
                return Ok(self.halt(index, error));
            }

            if let Some(stage) = self.registry.get(index).and_then(|step| step.review) {
                set_step_status(&mut self.session, &self.sink, index, StepStatus::Waiting);
                self.log(
                    SYSTEM,
                    format!("Reached review checkpoint ({}).", stage.label()),
                    LogKind::Warning,
                );
                return Ok(self.suspend(stage, index));
            }

            index += 1;
            self.session.cursor = index;
            self.publish();
            if index < self.registry.len() {
                pause(self.pacing.advance_delay_ms).await;
            }
        }
    }

    /// Approve the open gate and continue with the next step.
    ///
    /// Approving the initial gate starts step 0.
    pub async fn approve(&mut self) -> Result<RunOutcome, EngineError> {
        let Some(stage) = self.session.hitl_stage else {
            return Err(EngineError::NoOpenGate);
        };
        if !self.session.is_processing {
            return Err(EngineError::NotRunning);
        }

        close_gate(&mut self.session, &self.sink, GateResolution::Approved);
        self.log(USER, "Approved. Moving on to the next step.", LogKind::Info);
        tracing::info!(stage = %stage, "gate approved");

        let next = if stage == ReviewStage::InitialApproval {
            self.session.initial_approved = true;
            0
        } else {
            let cursor = self.session.cursor;
            set_step_status(&mut self.session, &self.sink, cursor, StepStatus::Completed);
            cursor + 1
        };
        self.session.cursor = next;
        self.advance(next, None).await
    }

    /// Re-run the gated step with additional instructions.
    ///
    /// When `feedback` is absent or blank the pending feedback from
    /// [`set_feedback`](Self::set_feedback) is used. Revising the initial
    /// gate starts step 0 with the feedback.
    pub async fn request_revision(
        &mut self,
        feedback: Option<String>,
    ) -> Result<RunOutcome, EngineError> {
        let Some(stage) = self.session.hitl_stage else {
            return Err(EngineError::NoOpenGate);
        };
        if !self.session.is_processing {
            return Err(EngineError::NotRunning);
        }

        let feedback = normalize_feedback(feedback)
            .or_else(|| normalize_feedback(Some(self.session.hitl_feedback.clone())));
        let text = feedback.clone().unwrap_or_default();

        close_gate(
            &mut self.session,
            &self.sink,
            GateResolution::RevisionRequested {
                feedback: text.clone(),
            },
        );
        self.log(USER, format!("Revision requested: {}", text), LogKind::Warning);
        tracing::info!(stage = %stage, "revision requested");

        let index = if stage == ReviewStage::InitialApproval {
            self.session.initial_approved = true;
            0
        } else {
            self.session.cursor
        };
        self.advance(index, feedback).await
    }

    /// Replace the pending reviewer feedback.
    pub fn set_feedback(&mut self, text: impl Into<String>) {
        self.session.hitl_feedback = text.into();
        self.publish();
    }

    /// Run one step through its agent and store the result.
    ///
    /// Partial message chunks are accumulated and only the complete text is
    /// recorded.
    async fn execute_step(
        &mut self,
        index: usize,
        feedback: Option<String>,
    ) -> Result<(), AgentError> {
        let Some(step) = self.registry.get(index).cloned() else {
            return Err(AgentError::ExecutionError(format!(
                "No step at index {}",
                index
            )));
        };

        self.session.cursor = index;
        set_step_status(&mut self.session, &self.sink, index, StepStatus::Running);
        self.log(
            ORCHESTRATOR,
            format!("{} is running...", step.agent_name),
            LogKind::Thinking,
        );
        tracing::debug!(step = %step.id, index, revision = feedback.is_some(), "step started");

        let context = accumulate_context(self.registry.steps(), &self.session.steps, index);
        let request = StepRequest::new(step.clone(), self.input.clone())
            .with_context(context)
            .with_feedback(feedback);

        let started = Instant::now();
        let mut stream = self.agent_manager.execute(&request).await?;
        let mut result = String::new();

        while let Some(event) = stream.next().await {
            match event? {
                AgentEvent::Thought(thought) => {
                    self.log(&step.agent_name, thought, LogKind::Thinking);
                }
                AgentEvent::ToolCall(tool) => {
                    self.log(&step.agent_name, tool, LogKind::Tool);
                }
                AgentEvent::MessageChunk(chunk) => result.push_str(&chunk),
                AgentEvent::Completed => break,
            }
        }

        let elapsed = format!("{:.1}s", started.elapsed().as_secs_f64());
        tracing::debug!(step = %step.id, elapsed = %elapsed, "step finished");

        complete_step(&mut self.session, &self.sink, index, result, elapsed);
        self.log(
            ORCHESTRATOR,
            format!("{} finished.", step.agent_name),
            LogKind::Success,
        );
        Ok(())
    }

    fn suspend(&mut self, stage: ReviewStage, step_index: usize) -> RunOutcome {
        open_gate(&mut self.session, &self.sink, stage, step_index);
        tracing::info!(stage = %stage, step_index, "awaiting review");
        RunOutcome::AwaitingGate { stage, step_index }
    }

    fn finish(&mut self) -> RunOutcome {
        self.log(
            ORCHESTRATOR,
            "The full pipeline completed successfully.",
            LogKind::Success,
        );
        let quality_score = self.scorer.score(self.registry.steps(), &self.session);
        complete_session(&mut self.session, &self.sink, quality_score);
        tracing::info!(quality_score, "pipeline completed");
        RunOutcome::Completed { quality_score }
    }

    fn halt(&mut self, step_index: usize, error: AgentError) -> RunOutcome {
        let agent = self
            .registry
            .get(step_index)
            .map(|step| step.agent_name.clone())
            .unwrap_or_else(|| SYSTEM.to_string());
        let message = error.to_string();

        self.log(&agent, format!("Error: {}", message), LogKind::Error);
        fail_session(&mut self.session, &self.sink, step_index, message);
        tracing::warn!(step_index, agent = %agent, error = %error, "pipeline failed");
        RunOutcome::Failed { step_index }
    }

    fn log(&mut self, agent: &str, message: impl Into<String>, kind: LogKind) {
        log_to_session(&mut self.session, &self.sink, agent, message, kind);
    }

    fn publish(&self) {
        self.sink.publish(&self.session);
    }
}

fn normalize_feedback(feedback: Option<String>) -> Option<String> {
    feedback
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

async fn pause(millis: u64) {
    if millis > 0 {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}
