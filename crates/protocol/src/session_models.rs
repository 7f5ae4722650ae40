//! Runtime session models.
//!
//! A session is the mutable record of one pipeline run: per-step runtimes,
//! the cursor, the open review gate, the event log and the final score.
//! It is created fresh at every pipeline start; nothing carries across runs.

use crate::step_models::{ReviewStage, StepRuntime, StepStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// How thoroughly the research agents analyse the passage.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisDepth {
    Standard,
    #[default]
    Deep,
}

/// User-provided settings passed unmodified to every agent invocation.
///
/// # Example
///
/// ```toml
/// # .sermon-pipeline/input.toml
/// passage = "Romans 8:28-30"
/// theme = "God's great plan and the believer's assurance"
/// audience = "General congregation"
/// length = "30 minutes (about 4,500 characters)"
/// analysis-level = "deep"
/// sermon-type = "Expository"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineInput {
    /// Scripture reference, e.g. `Romans 8:28-30`.
    pub passage: String,
    pub theme: String,
    pub audience: String,
    /// Target length descriptor.
    pub length: String,
    #[serde(default)]
    pub analysis_level: AnalysisDepth,
    pub sermon_type: String,
}

impl Default for PipelineInput {
    fn default() -> Self {
        Self {
            passage: "Romans 8:28-30".to_string(),
            theme: "God's great plan and the believer's assurance".to_string(),
            audience: "General congregation".to_string(),
            length: "30 minutes (about 4,500 characters)".to_string(),
            analysis_level: AnalysisDepth::Deep,
            sermon_type: "Expository".to_string(),
        }
    }
}

/// Category of an event log entry.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Info,
    Success,
    Warning,
    Error,
    Thinking,
    Tool,
    Agent,
}

/// One append-only entry of the session event log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct LogEntry {
    #[ts(type = "string")]
    pub timestamp: DateTime<Utc>,

    /// Attribution label: `Orchestrator`, `System`, `User` or a step's agent name.
    pub agent: String,

    pub message: String,

    #[serde(rename = "type")]
    pub kind: LogKind,
}

impl LogEntry {
    pub fn new(agent: impl Into<String>, message: impl Into<String>, kind: LogKind) -> Self {
        Self {
            timestamp: Utc::now(),
            agent: agent.into(),
            message: message.into(),
            kind,
        }
    }
}

/// Pipeline-level lifecycle derived from a [`SessionState`].
///
/// `Idle -> AwaitingInitialApproval -> Running <-> AwaitingReview -> Completed | Failed`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStatus {
    Idle,
    AwaitingInitialApproval,
    Running,
    AwaitingReview,
    Completed,
    Failed,
}

/// The full mutable record of one pipeline run.
///
/// Only the orchestrator writes to this structure; everyone else receives
/// cloned snapshots.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct SessionState {
    /// Identifier of this run, regenerated at every start.
    #[ts(type = "string")]
    pub id: Uuid,

    /// One runtime per registry step, in registry order.
    pub steps: Vec<StepRuntime>,

    /// Index of the step currently active or about to run.
    pub cursor: usize,

    /// The open review gate, if any. At most one is open at a time.
    pub hitl_stage: Option<ReviewStage>,

    /// Pending reviewer feedback, cleared when the gate is resolved.
    pub hitl_feedback: String,

    /// Set once the initial-approval gate has been resolved in this run.
    pub initial_approved: bool,

    pub logs: Vec<LogEntry>,

    /// True from pipeline start until terminal completion or failure.
    pub is_processing: bool,

    /// Present only after the run reaches terminal completion.
    pub quality_score: Option<f64>,
}

impl SessionState {
    /// An idle session with every step pending.
    pub fn idle<I, S>(step_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: Uuid::new_v4(),
            steps: step_ids.into_iter().map(StepRuntime::pending).collect(),
            cursor: 0,
            hitl_stage: None,
            hitl_feedback: String::new(),
            initial_approved: false,
            logs: Vec::new(),
            is_processing: false,
            quality_score: None,
        }
    }

    pub fn status(&self) -> PipelineStatus {
        if self.quality_score.is_some() {
            return PipelineStatus::Completed;
        }
        if self.steps.iter().any(|s| s.status == StepStatus::Failed) {
            return PipelineStatus::Failed;
        }
        match self.hitl_stage {
            Some(ReviewStage::InitialApproval) => PipelineStatus::AwaitingInitialApproval,
            Some(_) => PipelineStatus::AwaitingReview,
            None if self.is_processing => PipelineStatus::Running,
            None => PipelineStatus::Idle,
        }
    }

    /// Number of steps that currently hold a result.
    pub fn completed_count(&self) -> usize {
        self.steps.iter().filter(|s| s.result.is_some()).count()
    }
}
