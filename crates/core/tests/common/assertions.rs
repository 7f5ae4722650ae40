//! Custom assertion helpers over event sequences and session state.

use sp_protocol::ipc::Event;
use sp_protocol::session_models::{LogKind, SessionState};
use sp_protocol::step_models::ReviewStage;
use std::time::Duration;
use tokio::sync::mpsc;

/// Drain every event currently queued.
#[allow(dead_code)]
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Collect events until `stop` matches one (inclusive) or `timeout` passes.
#[allow(dead_code)]
pub async fn collect_until(
    rx: &mut mpsc::UnboundedReceiver<Event>,
    timeout: Duration,
    stop: impl Fn(&Event) -> bool,
) -> Vec<Event> {
    let mut events = Vec::new();
    let deadline = tokio::time::Instant::now() + timeout;

    while let Ok(Some(event)) = tokio::time::timeout_at(deadline, rx.recv()).await {
        let done = stop(&event);
        events.push(event);
        if done {
            break;
        }
    }

    events
}

#[allow(dead_code)]
pub fn is_terminal(event: &Event) -> bool {
    matches!(
        event,
        Event::PipelineCompleted { .. } | Event::PipelineFailed { .. }
    )
}

/// `(stage, step index)` of every `GateOpened` event, in order.
#[allow(dead_code)]
pub fn gate_openings(events: &[Event]) -> Vec<(ReviewStage, usize)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::GateOpened {
                stage, step_index, ..
            } => Some((*stage, *step_index)),
            _ => None,
        })
        .collect()
}

/// Assert that nothing is logged by `agents` after the first error entry.
#[allow(dead_code)]
pub fn assert_no_logs_after_failure(session: &SessionState, later_agents: &[String]) {
    let failure = session
        .logs
        .iter()
        .position(|entry| entry.kind == LogKind::Error)
        .expect("session should contain an error entry");

    for entry in &session.logs[failure + 1..] {
        assert!(
            !later_agents.contains(&entry.agent),
            "Unexpected log from {} after the failure: {}",
            entry.agent,
            entry.message
        );
    }
}

/// Assert that a string contains a substring (case-insensitive).
#[allow(dead_code)]
pub fn assert_contains_ci(haystack: &str, needle: &str) {
    assert!(
        haystack.to_lowercase().contains(&needle.to_lowercase()),
        "Expected '{}' to contain '{}' (case-insensitive)",
        haystack,
        needle
    );
}
