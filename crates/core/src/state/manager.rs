//! Session manager: the single writer for one pipeline session.
//!
//! The SessionManager moves a [`PipelineEngine`] into a background task and
//! feeds it [`Op`]s one at a time. Presentation layers talk to it only
//! through a [`SessionHandle`]: they send operations, read events from the
//! engine's event channel, and observe read-only snapshots of the session.

use crate::engine::{EngineError, PipelineEngine};
use sp_protocol::ipc::{Event, Op};
use sp_protocol::session_models::{PipelineInput, SessionState};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

/// Capacity of the operation queue.
const OP_QUEUE_CAPACITY: usize = 32;

/// Returned when the session task is no longer draining operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("The session task has stopped")]
pub struct SessionClosed;

/// Drains operations for one session and applies them to the engine.
pub struct SessionManager {
    engine: PipelineEngine,
    ops_rx: mpsc::Receiver<Op>,
    events_tx: mpsc::UnboundedSender<Event>,
}

impl SessionManager {
    /// Move the engine into a background task and return a handle to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(engine: PipelineEngine) -> SessionHandle {
        let (ops_tx, ops_rx) = mpsc::channel(OP_QUEUE_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.session().clone());
        let events_tx = engine.events_sender();

        let manager = Self {
            engine: engine.with_snapshots(snapshot_tx),
            ops_rx,
            events_tx,
        };
        let task = tokio::spawn(manager.run());

        SessionHandle {
            ops_tx,
            snapshots: snapshot_rx,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    async fn run(mut self) {
        while let Some(op) = self.ops_rx.recv().await {
            if matches!(op, Op::Shutdown) {
                tracing::debug!("session shutdown requested");
                break;
            }
            self.handle(op).await;
        }
    }

    async fn handle(&mut self, op: Op) {
        let result = match op {
            Op::StartPipeline { input } => self.engine.start(input).await,
            Op::ApproveGate => self.engine.approve().await,
            Op::RequestRevision { feedback } => self.engine.request_revision(feedback).await,
            Op::UpdateFeedback { text } => {
                self.engine.set_feedback(text);
                return;
            }
            Op::GetSnapshot => {
                let state = Box::new(self.engine.session().clone());
                let _ = self.events_tx.send(Event::Snapshot { state });
                return;
            }
            Op::Shutdown => return,
        };

        match result {
            Ok(outcome) => tracing::debug!(?outcome, "operation applied"),
            Err(error) => self.reject(error),
        }
    }

    fn reject(&self, error: EngineError) {
        tracing::warn!(%error, "operation rejected");
        let _ = self.events_tx.send(Event::OpRejected {
            reason: error.to_string(),
        });
    }
}

/// Cloneable handle to a running [`SessionManager`].
#[derive(Clone)]
pub struct SessionHandle {
    ops_tx: mpsc::Sender<Op>,
    snapshots: watch::Receiver<SessionState>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SessionHandle {
    /// Queue an operation.
    ///
    /// # Errors
    ///
    /// Returns `SessionClosed` if the session task has stopped.
    pub async fn send(&self, op: Op) -> Result<(), SessionClosed> {
        self.ops_tx.send(op).await.map_err(|_| SessionClosed)
    }

    pub async fn start(&self, input: PipelineInput) -> Result<(), SessionClosed> {
        self.send(Op::StartPipeline { input }).await
    }

    pub async fn approve(&self) -> Result<(), SessionClosed> {
        self.send(Op::ApproveGate).await
    }

    pub async fn request_revision(&self, feedback: Option<String>) -> Result<(), SessionClosed> {
        self.send(Op::RequestRevision { feedback }).await
    }

    pub async fn update_feedback(&self, text: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(Op::UpdateFeedback { text: text.into() }).await
    }

    pub async fn request_snapshot(&self) -> Result<(), SessionClosed> {
        self.send(Op::GetSnapshot).await
    }

    /// Receiver that observes every published session state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.snapshots.clone()
    }

    /// The most recently published session state.
    pub fn snapshot(&self) -> SessionState {
        self.snapshots.borrow().clone()
    }

    /// Stop the session task after the queued operations and wait for it.
    pub async fn shutdown(&self) {
        let _ = self.ops_tx.send(Op::Shutdown).await;
        if let Some(task) = self.task.lock().await.take() {
            let _ = task.await;
        }
    }
}
