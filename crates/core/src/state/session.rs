//! Session state machine functions.
//!
//! Every mutation of a [`SessionState`] goes through one of these functions,
//! which apply the change and report it through a [`SessionSink`].

use crate::registry::StepRegistry;
use sp_protocol::ipc::{Event, GateResolution};
use sp_protocol::session_models::{LogEntry, LogKind, SessionState};
use sp_protocol::step_models::{ReviewStage, StepStatus};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch;

/// Destination for session changes.
///
/// Each change is published to the snapshot channel before its event is
/// sent, so a reader reacting to an event always sees a snapshot at least as
/// new. Neither channel ever makes the writer wait.
#[derive(Clone)]
pub struct SessionSink {
    events_tx: UnboundedSender<Event>,
    snapshots: Option<watch::Sender<SessionState>>,
}

impl SessionSink {
    pub fn new(events_tx: UnboundedSender<Event>) -> Self {
        Self {
            events_tx,
            snapshots: None,
        }
    }

    pub fn with_snapshots(mut self, snapshots: watch::Sender<SessionState>) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    pub fn events_sender(&self) -> UnboundedSender<Event> {
        self.events_tx.clone()
    }

    /// Replace the published snapshot.
    pub fn publish(&self, session: &SessionState) {
        if let Some(snapshots) = &self.snapshots {
            snapshots.send_replace(session.clone());
        }
    }

    /// Publish the session, then send `event`.
    pub fn emit(&self, session: &SessionState, event: Event) {
        self.publish(session);
        if self.events_tx.send(event).is_err() {
            tracing::trace!(session = %session.id, "event receiver dropped");
        }
    }
}

/// Create an idle session with one pending runtime per registry step.
pub fn create_session(registry: &StepRegistry) -> SessionState {
    SessionState::idle(registry.iter().map(|step| step.id.clone()))
}

/// Replace the session with a fresh run and emit `SessionStarted`.
///
/// Every status goes back to pending and every result, log entry and
/// score from the previous run is discarded.
pub fn reset_session(session: &mut SessionState, registry: &StepRegistry, sink: &SessionSink) {
    *session = create_session(registry);
    session.is_processing = true;
    let event = Event::SessionStarted {
        session_id: session.id,
        step_count: session.steps.len(),
    };
    sink.emit(session, event);
}

/// Append an entry to the event log and emit `LogAppended`.
pub fn log_to_session(
    session: &mut SessionState,
    sink: &SessionSink,
    agent: &str,
    message: impl Into<String>,
    kind: LogKind,
) {
    let entry = LogEntry::new(agent, message, kind);
    session.logs.push(entry.clone());
    let event = Event::LogAppended {
        session_id: session.id,
        entry,
    };
    sink.emit(session, event);
}

/// Set the status of one step and emit `StepStatusUpdate`.
pub fn set_step_status(
    session: &mut SessionState,
    sink: &SessionSink,
    step_index: usize,
    status: StepStatus,
) {
    let Some(runtime) = session.steps.get_mut(step_index) else {
        return;
    };
    runtime.status = status;
    let event = Event::StepStatusUpdate {
        session_id: session.id,
        step_index,
        status,
    };
    sink.emit(session, event);
}

/// Record a step's result and mark it completed.
pub fn complete_step(
    session: &mut SessionState,
    sink: &SessionSink,
    step_index: usize,
    result: String,
    thinking_time: String,
) {
    if let Some(runtime) = session.steps.get_mut(step_index) {
        runtime.result = Some(result);
        runtime.thinking_time = Some(thinking_time);
    }
    set_step_status(session, sink, step_index, StepStatus::Completed);
}

/// Suspend the run at `step_index` behind a review gate.
pub fn open_gate(
    session: &mut SessionState,
    sink: &SessionSink,
    stage: ReviewStage,
    step_index: usize,
) {
    session.hitl_stage = Some(stage);
    session.cursor = step_index;
    let event = Event::GateOpened {
        session_id: session.id,
        stage,
        step_index,
    };
    sink.emit(session, event);
}

/// Close the open gate, clear pending feedback and emit `GateResolved`.
///
/// Returns the stage that was closed, or `None` when no gate was open.
pub fn close_gate(
    session: &mut SessionState,
    sink: &SessionSink,
    resolution: GateResolution,
) -> Option<ReviewStage> {
    let stage = session.hitl_stage.take()?;
    session.hitl_feedback.clear();
    let event = Event::GateResolved {
        session_id: session.id,
        stage,
        resolution,
    };
    sink.emit(session, event);
    Some(stage)
}

/// Store the final score and end the run successfully.
pub fn complete_session(session: &mut SessionState, sink: &SessionSink, quality_score: f64) {
    session.is_processing = false;
    session.cursor = session.steps.len();
    session.quality_score = Some(quality_score);
    let event = Event::PipelineCompleted {
        session_id: session.id,
        quality_score,
    };
    sink.emit(session, event);
}

/// Mark the step failed and halt the run.
pub fn fail_session(
    session: &mut SessionState,
    sink: &SessionSink,
    step_index: usize,
    error: String,
) {
    session.is_processing = false;
    session.cursor = step_index;
    set_step_status(session, sink, step_index, StepStatus::Failed);
    let event = Event::PipelineFailed {
        session_id: session.id,
        step_index,
        error,
    };
    sink.emit(session, event);
}
