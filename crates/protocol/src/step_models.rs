//! Step catalog models.
//!
//! A pipeline is an ordered list of [`StepDefinition`]s. Definitions are
//! immutable for the lifetime of the process; the mutable per-run record of
//! each step lives in a [`StepRuntime`] with the same identity and position.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Coarse grouping of pipeline steps.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
pub enum Phase {
    Research,
    Planning,
    Implementation,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "Research",
            Self::Planning => "Planning",
            Self::Implementation => "Implementation",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a single step within one run.
///
/// Normal progression is `Pending -> Running -> Completed`. A gated step
/// moves on to `Waiting` until a reviewer resolves its gate; a revision sends
/// it back through `Running`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Waiting,
    Completed,
    Failed,
}

/// Human-in-the-loop review checkpoints.
///
/// This is a closed set: every gated step names exactly one stage, so a
/// gated step that fails to open a gate cannot be expressed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewStage {
    /// Confirm the pipeline settings before any research step runs.
    InitialApproval,
    /// Review after the rhetorical analysis closes the research phase.
    RhetoricalAnalysis,
    /// Review of the core message (big idea) and main points.
    CoreMessage,
    /// Review of the sermon outline.
    Outline,
    /// Review of the final quality assessment.
    FinalReview,
}

impl ReviewStage {
    /// Short checkpoint label, e.g. `HITL-3`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InitialApproval => "HITL-1",
            Self::RhetoricalAnalysis => "HITL-2",
            Self::CoreMessage => "HITL-3",
            Self::Outline => "HITL-4",
            Self::FinalReview => "HITL-5",
        }
    }

    /// Guidance shown to the reviewer when this gate opens.
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::InitialApproval => {
                "Review the settings one last time before the deep analysis starts. \
                 From here on every research agent works from these inputs."
            }
            _ => {
                "Review the agent's intermediate result. You may add feedback to steer \
                 the direction of the next step."
            }
        }
    }
}

impl fmt::Display for ReviewStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable description of one pipeline step.
///
/// # Example
///
/// ```yaml
/// - id: outline-architect
///   phase: Planning
///   agent-name: Outline Designer
///   description: Design the sermon outline and its flow
///   review: outline
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct StepDefinition {
    /// Unique key of the step within its registry.
    pub id: String,

    pub phase: Phase,

    /// Informational sub-grouping of research steps. Not an execution unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave: Option<u8>,

    /// Role identity used for display and to select the agent's role.
    pub agent_name: String,

    pub description: String,

    /// Review stage opened when this step completes, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewStage>,
}

impl StepDefinition {
    pub fn new(
        id: impl Into<String>,
        phase: Phase,
        agent_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            phase,
            wave: None,
            agent_name: agent_name.into(),
            description: description.into(),
            review: None,
        }
    }

    pub fn with_wave(mut self, wave: u8) -> Self {
        self.wave = Some(wave);
        self
    }

    pub fn with_review(mut self, stage: ReviewStage) -> Self {
        self.review = Some(stage);
        self
    }

    /// Whether completing this step suspends the run for human review.
    pub fn requires_hitl(&self) -> bool {
        self.review.is_some()
    }
}

/// Mutable per-run record of a step.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct StepRuntime {
    /// Same identity as the [`StepDefinition`] at this position.
    pub step_id: String,

    pub status: StepStatus,

    /// Generated artifact. Overwritten by a revision, cleared only by a restart.
    pub result: Option<String>,

    /// Wall time of the last invocation, e.g. `"3.2s"`.
    pub thinking_time: Option<String>,
}

impl StepRuntime {
    pub fn pending(step_id: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            status: StepStatus::Pending,
            result: None,
            thinking_time: None,
        }
    }
}
