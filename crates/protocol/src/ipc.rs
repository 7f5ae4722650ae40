//! Inter-process communication protocol.
//!
//! This module defines the message types exchanged between a presentation
//! layer (CLI, UI) and the orchestration core.
//!
//! The protocol follows an Operation/Event pattern:
//! - `Op`: Commands sent from the presentation layer to the core
//! - `Event`: Status updates sent from the core to the presentation layer
//!
//! Ops are drained one at a time by the session's single writer, so a
//! presentation layer never mutates session state directly.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::session_models::{LogEntry, PipelineInput, SessionState};
use crate::step_models::{ReviewStage, StepStatus};

/// Operations sent from the presentation layer to the core.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "requestRevision",
///   "payload": { "feedback": "Emphasise the pastoral application" }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Op {
    /// Start (or restart) the pipeline with the given input.
    ///
    /// Restarting discards every result of the previous run.
    StartPipeline { input: PipelineInput },

    /// Approve the open gate and continue with the next step.
    ApproveGate,

    /// Re-run the gated step with additional instructions.
    ///
    /// When `feedback` is absent the pending feedback set through
    /// `UpdateFeedback` is used.
    RequestRevision { feedback: Option<String> },

    /// Replace the pending reviewer feedback text.
    UpdateFeedback { text: String },

    /// Ask the core to emit a `Snapshot` event.
    GetSnapshot,

    /// Stop draining operations.
    Shutdown,
}

/// How a review gate was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GateResolution {
    Approved,
    RevisionRequested { feedback: String },
}

/// Events sent from the core to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A new run has been initialised.
    SessionStarted {
        #[ts(type = "string")]
        session_id: Uuid,
        step_count: usize,
    },

    /// A step's status has changed.
    StepStatusUpdate {
        #[ts(type = "string")]
        session_id: Uuid,
        step_index: usize,
        status: StepStatus,
    },

    /// An entry was appended to the session event log.
    LogAppended {
        #[ts(type = "string")]
        session_id: Uuid,
        entry: LogEntry,
    },

    /// The run is suspended until the gate is resolved.
    GateOpened {
        #[ts(type = "string")]
        session_id: Uuid,
        stage: ReviewStage,
        step_index: usize,
    },

    /// A gate was closed by a reviewer decision.
    GateResolved {
        #[ts(type = "string")]
        session_id: Uuid,
        stage: ReviewStage,
        resolution: GateResolution,
    },

    /// Every step finished. Terminal.
    PipelineCompleted {
        #[ts(type = "string")]
        session_id: Uuid,
        quality_score: f64,
    },

    /// A step failed and the run halted. Terminal.
    PipelineFailed {
        #[ts(type = "string")]
        session_id: Uuid,
        step_index: usize,
        error: String,
    },

    /// Response to `Op::GetSnapshot`.
    Snapshot { state: Box<SessionState> },

    /// An operation was not valid in the current state.
    OpRejected { reason: String },
}
