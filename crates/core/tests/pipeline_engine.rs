//! Integration tests for PipelineEngine.
//!
//! These tests verify that the PipelineEngine correctly:
//! - Holds step 0 behind the initial approval gate
//! - Passes the exact accumulated context to every step
//! - Suspends at review gates and resumes through approve / revise
//! - Halts on agent failure
//! - Resets everything on restart

mod common;

use common::*;
use sp_core::agents::manager::AgentManager;
use sp_core::engine::{EngineError, PipelineEngine, RunOutcome};
use sp_protocol::config_models::PacingConfig;
use sp_protocol::ipc::{Event, GateResolution};
use sp_protocol::session_models::{LogKind, PipelineInput, PipelineStatus};
use sp_protocol::step_models::{ReviewStage, StepStatus};
use std::sync::Arc;
use tokio::sync::mpsc;

fn expected_context(step_ids: &[(usize, Option<&str>)]) -> String {
    step_ids
        .iter()
        .map(|(i, feedback)| {
            format!(
                "[Agent {}]\n{}",
                i,
                recorded_result(&format!("step-{i}"), *feedback)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[tokio::test]
async fn test_step_zero_waits_for_initial_approval() {
    let agent = RecordingAgent::new();
    let (mut engine, mut rx) = test_engine(registry_with_gates(3, &[]), Arc::new(agent.clone()));

    let outcome = engine.start(PipelineInput::default()).await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::AwaitingGate {
            stage: ReviewStage::InitialApproval,
            step_index: 0
        }
    );
    assert!(agent.requests().is_empty(), "no agent may run before approval");
    assert_eq!(
        engine.session().status(),
        PipelineStatus::AwaitingInitialApproval
    );

    let events = drain_events(&mut rx);
    assert!(matches!(events[0], Event::SessionStarted { step_count: 3, .. }));
    assert_eq!(
        gate_openings(&events),
        vec![(ReviewStage::InitialApproval, 0)]
    );
    let warning = engine.session().logs.last().unwrap();
    assert_eq!(warning.kind, LogKind::Warning);
    assert_eq!(warning.agent, "System");
}

#[tokio::test]
async fn test_context_is_exact_concatenation_of_prior_results() {
    let agent = RecordingAgent::new();
    let (mut engine, _rx) = test_engine(registry_with_gates(4, &[]), Arc::new(agent.clone()));

    engine.start(PipelineInput::default()).await.unwrap();
    let outcome = engine.approve().await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            quality_score: TEST_SCORE
        }
    );

    let requests = agent.requests();
    assert_eq!(agent.step_ids(), vec!["step-0", "step-1", "step-2", "step-3"]);
    assert_eq!(requests[0].context, "");
    assert_eq!(requests[1].context, expected_context(&[(0, None)]));
    assert_eq!(
        requests[3].context,
        expected_context(&[(0, None), (1, None), (2, None)])
    );
    assert!(requests.iter().all(|r| r.feedback.is_none()));
    assert!(requests.iter().all(|r| r.input == PipelineInput::default()));
}

#[tokio::test]
async fn test_chunks_are_joined_and_thoughts_logged() {
    let agent = RecordingAgent::new();
    let (mut engine, _rx) = test_engine(registry_with_gates(1, &[]), Arc::new(agent));

    engine.start(PipelineInput::default()).await.unwrap();
    engine.approve().await.unwrap();

    let runtime = &engine.session().steps[0];
    assert_eq!(runtime.result.as_deref(), Some("step-0 result"));
    assert!(runtime
        .thinking_time
        .as_deref()
        .is_some_and(|t| t.ends_with('s')));

    let thought = engine
        .session()
        .logs
        .iter()
        .find(|l| l.agent == "Agent 0" && l.kind == LogKind::Thinking)
        .expect("thought should be logged");
    assert_eq!(thought.message, "Working on step-0");
}

#[tokio::test]
async fn test_approve_advances_by_exactly_one() {
    let agent = RecordingAgent::new();
    let (mut engine, mut rx) =
        test_engine(registry_with_gates(4, &[1, 2]), Arc::new(agent.clone()));

    engine.start(PipelineInput::default()).await.unwrap();
    let outcome = engine.approve().await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::AwaitingGate {
            stage: ReviewStage::RhetoricalAnalysis,
            step_index: 1
        }
    );
    assert_eq!(engine.session().cursor, 1);
    assert_eq!(engine.session().steps[1].status, StepStatus::Waiting);
    assert_eq!(engine.session().steps[2].status, StepStatus::Pending);

    let outcome = engine.approve().await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::AwaitingGate {
            stage: ReviewStage::CoreMessage,
            step_index: 2
        }
    );
    assert_eq!(engine.session().cursor, 2);
    assert_eq!(engine.session().steps[1].status, StepStatus::Completed);
    assert_eq!(agent.step_ids(), vec!["step-0", "step-1", "step-2"]);

    // Gated step status: running, completed, waiting, completed after approval
    let statuses: Vec<StepStatus> = drain_events(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            Event::StepStatusUpdate {
                step_index: 1,
                status,
                ..
            } => Some(status),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![
            StepStatus::Running,
            StepStatus::Completed,
            StepStatus::Waiting,
            StepStatus::Completed
        ]
    );
}

#[tokio::test]
async fn test_revision_reruns_same_step_with_feedback() {
    let agent = RecordingAgent::new();
    let (mut engine, mut rx) = test_engine(registry_with_gates(3, &[1]), Arc::new(agent.clone()));

    engine.start(PipelineInput::default()).await.unwrap();
    engine.approve().await.unwrap();

    let outcome = engine
        .request_revision(Some("Add Old Testament background".to_string()))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::AwaitingGate {
            stage: ReviewStage::RhetoricalAnalysis,
            step_index: 1
        }
    );
    assert_eq!(engine.session().cursor, 1, "cursor must not move on revision");
    assert_eq!(agent.step_ids(), vec!["step-0", "step-1", "step-1"]);

    let revision = &agent.requests()[2];
    assert_eq!(
        revision.feedback.as_deref(),
        Some("Add Old Testament background")
    );
    assert_eq!(revision.context, expected_context(&[(0, None)]));
    assert_eq!(
        engine.session().steps[1].result.as_deref(),
        Some(recorded_result("step-1", Some("Add Old Testament background")).as_str())
    );

    let events = drain_events(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::GateResolved {
            resolution: GateResolution::RevisionRequested { feedback },
            ..
        } if feedback == "Add Old Testament background"
    )));

    // The next step sees the revised result
    engine.approve().await.unwrap();
    assert_eq!(
        agent.requests()[3].context,
        expected_context(&[(0, None), (1, Some("Add Old Testament background"))])
    );
}

#[tokio::test]
async fn test_revision_uses_pending_feedback() {
    let agent = RecordingAgent::new();
    let (mut engine, _rx) = test_engine(registry_with_gates(2, &[1]), Arc::new(agent.clone()));

    engine.start(PipelineInput::default()).await.unwrap();
    engine.approve().await.unwrap();

    engine.set_feedback("Shorter illustrations");
    assert_eq!(engine.session().hitl_feedback, "Shorter illustrations");
    engine.request_revision(None).await.unwrap();

    assert_eq!(
        agent.requests()[2].feedback.as_deref(),
        Some("Shorter illustrations")
    );
    assert!(
        engine.session().hitl_feedback.is_empty(),
        "feedback is cleared when the gate closes"
    );
}

#[tokio::test]
async fn test_revision_of_initial_gate_runs_step_zero_with_feedback() {
    let agent = RecordingAgent::new();
    let (mut engine, _rx) = test_engine(registry_with_gates(2, &[]), Arc::new(agent.clone()));

    engine.start(PipelineInput::default()).await.unwrap();
    let outcome = engine
        .request_revision(Some("Focus on verse 28".to_string()))
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Completed { .. }));
    let requests = agent.requests();
    assert_eq!(requests[0].step.id, "step-0");
    assert_eq!(requests[0].feedback.as_deref(), Some("Focus on verse 28"));
    assert!(requests[1].feedback.is_none());
}

#[tokio::test]
async fn test_gate_blocks_execution_until_resolved() {
    let agent = RecordingAgent::new();
    let (mut engine, _rx) = test_engine(registry_with_gates(3, &[1]), Arc::new(agent.clone()));

    engine.start(PipelineInput::default()).await.unwrap();
    engine.approve().await.unwrap();

    assert_eq!(
        engine.advance(2, None).await,
        Err(EngineError::GateOpen(ReviewStage::RhetoricalAnalysis))
    );
    assert_eq!(
        engine.advance(1, Some("again".to_string())).await,
        Err(EngineError::GateOpen(ReviewStage::RhetoricalAnalysis))
    );
    assert_eq!(agent.requests().len(), 2);
}

#[tokio::test]
async fn test_failure_halts_the_run() {
    let agent = FailingAgent::new("step-2", "quota exceeded");
    let recorder = agent.inner.clone();
    let (mut engine, mut rx) = test_engine(registry_with_gates(5, &[]), Arc::new(agent));

    engine.start(PipelineInput::default()).await.unwrap();
    let outcome = engine.approve().await.unwrap();

    assert_eq!(outcome, RunOutcome::Failed { step_index: 2 });
    assert_eq!(recorder.step_ids(), vec!["step-0", "step-1"]);

    let session = engine.session();
    assert!(!session.is_processing);
    assert!(session.quality_score.is_none());
    assert_eq!(session.status(), PipelineStatus::Failed);
    assert_eq!(session.steps[2].status, StepStatus::Failed);
    assert!(session.steps[2].result.is_none());
    assert_eq!(session.steps[3].status, StepStatus::Pending);

    let errors: Vec<_> = session
        .logs
        .iter()
        .filter(|l| l.kind == LogKind::Error)
        .collect();
    assert_eq!(errors.len(), 1, "exactly one error entry");
    assert_eq!(errors[0].agent, "Agent 2");
    assert_contains_ci(&errors[0].message, "quota exceeded");

    let tool = session
        .logs
        .iter()
        .find(|l| l.kind == LogKind::Tool)
        .expect("tool call should be logged");
    assert_eq!(tool.message, "search_commentaries");

    assert_no_logs_after_failure(session, &["Agent 3".to_string(), "Agent 4".to_string()]);

    let events = drain_events(&mut rx);
    assert!(matches!(
        events.last(),
        Some(Event::PipelineFailed { step_index: 2, .. })
    ));

    assert_eq!(engine.advance(3, None).await, Err(EngineError::NotRunning));
    assert_eq!(engine.approve().await, Err(EngineError::NoOpenGate));
}

#[tokio::test]
async fn test_failed_revision_halts_at_the_gated_step() {
    let agent = FailingAgent::new("step-1", "model overloaded").on_revision();
    let recorder = agent.inner.clone();
    let (mut engine, mut rx) = test_engine(registry_with_gates(3, &[1]), Arc::new(agent));

    engine.start(PipelineInput::default()).await.unwrap();
    engine.approve().await.unwrap();
    assert_eq!(engine.session().hitl_stage, Some(ReviewStage::RhetoricalAnalysis));
    drain_events(&mut rx);

    let outcome = engine
        .request_revision(Some("Tighten the argument".to_string()))
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::Failed { step_index: 1 });
    assert_eq!(recorder.step_ids(), vec!["step-0", "step-1"]);

    let session = engine.session();
    assert_eq!(session.status(), PipelineStatus::Failed);
    assert!(session.hitl_stage.is_none(), "no gate stays open");
    assert_eq!(session.cursor, 1);
    assert_eq!(session.steps[1].status, StepStatus::Failed);
    assert_eq!(
        session.steps[1].result.as_deref(),
        Some(recorded_result("step-1", None).as_str()),
        "the earlier result is kept"
    );
    assert_eq!(session.steps[2].status, StepStatus::Pending);

    let errors: Vec<_> = session
        .logs
        .iter()
        .filter(|l| l.kind == LogKind::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].agent, "Agent 1");
    assert_contains_ci(&errors[0].message, "model overloaded");

    let events = drain_events(&mut rx);
    assert!(!events.iter().any(|e| matches!(e, Event::GateOpened { .. })));
    assert!(matches!(
        events.last(),
        Some(Event::PipelineFailed { step_index: 1, .. })
    ));
    assert_eq!(engine.approve().await, Err(EngineError::NoOpenGate));
}

#[tokio::test]
async fn test_fourteen_step_run_opens_four_gates() {
    let agent = RecordingAgent::new();
    let (mut engine, mut rx) =
        test_engine(registry_with_gates(14, &[11, 12, 13]), Arc::new(agent.clone()));

    let mut outcome = engine.start(PipelineInput::default()).await.unwrap();
    while let RunOutcome::AwaitingGate { .. } = outcome {
        outcome = engine.approve().await.unwrap();
    }

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            quality_score: TEST_SCORE
        }
    );
    assert_eq!(agent.requests().len(), 14);

    let events = drain_events(&mut rx);
    assert_eq!(
        gate_openings(&events),
        vec![
            (ReviewStage::InitialApproval, 0),
            (ReviewStage::RhetoricalAnalysis, 11),
            (ReviewStage::CoreMessage, 12),
            (ReviewStage::Outline, 13),
        ]
    );
    let completed = events
        .iter()
        .position(|e| matches!(e, Event::PipelineCompleted { .. }))
        .expect("completion event");
    assert_eq!(completed, events.len() - 1, "completion is the last event");

    let session = engine.session();
    assert_eq!(session.completed_count(), 14);
    assert_eq!(session.cursor, 14);
    assert!(!session.is_processing);
    assert_eq!(session.status(), PipelineStatus::Completed);
    assert_eq!(session.logs.last().unwrap().kind, LogKind::Success);
}

#[tokio::test]
async fn test_restart_resets_everything() {
    let agent = RecordingAgent::new();
    let (mut engine, _rx) = test_engine(registry_with_gates(3, &[]), Arc::new(agent));

    engine.start(PipelineInput::default()).await.unwrap();
    engine.approve().await.unwrap();
    let first_id = engine.session().id;
    assert!(engine.session().quality_score.is_some());

    engine.start(PipelineInput::default()).await.unwrap();

    let session = engine.session();
    assert_ne!(session.id, first_id);
    assert!(session
        .steps
        .iter()
        .all(|s| s.status == StepStatus::Pending && s.result.is_none()));
    assert!(session.quality_score.is_none());
    assert_eq!(session.logs.len(), 2, "only the new start and gate entries");
    assert_eq!(session.status(), PipelineStatus::AwaitingInitialApproval);
}

#[tokio::test]
async fn test_restart_after_failure() {
    let (mut engine, _rx) = test_engine(
        registry_with_gates(2, &[]),
        Arc::new(FailingAgent::new("step-0", "offline")),
    );

    engine.start(PipelineInput::default()).await.unwrap();
    engine.approve().await.unwrap();
    assert_eq!(engine.session().status(), PipelineStatus::Failed);

    engine.start(PipelineInput::default()).await.unwrap();
    assert!(engine
        .session()
        .steps
        .iter()
        .all(|s| s.status == StepStatus::Pending));
    assert!(engine.session().is_processing);
}

#[tokio::test]
async fn test_placeholder_score_in_range() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut engine = PipelineEngine::new(
        registry_with_gates(2, &[]),
        AgentManager::new(Arc::new(RecordingAgent::new())),
        tx,
    )
    .with_pacing(PacingConfig::immediate());

    engine.start(PipelineInput::default()).await.unwrap();
    let outcome = engine.approve().await.unwrap();

    let RunOutcome::Completed { quality_score } = outcome else {
        panic!("Expected completion, got {:?}", outcome);
    };
    assert!((4.5..=5.0).contains(&quality_score));
    assert_eq!(engine.session().quality_score, Some(quality_score));
}

#[tokio::test(start_paused = true)]
async fn test_pacing_delays_are_applied() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut engine = PipelineEngine::new(
        registry_with_gates(3, &[]),
        AgentManager::new(Arc::new(RecordingAgent::new())),
        tx,
    )
    .with_pacing(PacingConfig {
        start_delay_ms: 1000,
        advance_delay_ms: 600,
    });

    let started = tokio::time::Instant::now();
    engine.start(PipelineInput::default()).await.unwrap();
    assert!(started.elapsed() >= std::time::Duration::from_millis(1000));

    let approved = tokio::time::Instant::now();
    engine.approve().await.unwrap();
    // Two pauses between three steps
    assert!(approved.elapsed() >= std::time::Duration::from_millis(1200));
}
