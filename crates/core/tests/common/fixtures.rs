//! Test fixtures for registries, engines and configuration directories.

use sp_core::agents::base::Agent;
use sp_core::agents::manager::AgentManager;
use sp_core::engine::quality::FixedScorer;
use sp_core::engine::PipelineEngine;
use sp_core::registry::StepRegistry;
use sp_protocol::config_models::PacingConfig;
use sp_protocol::ipc::Event;
use sp_protocol::step_models::{Phase, ReviewStage, StepDefinition};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Score used by engines built with [`test_engine`].
#[allow(dead_code)]
pub const TEST_SCORE: f64 = 4.7;

/// Stages assigned, in order, to gated steps of [`registry_with_gates`].
const STAGES: [ReviewStage; 4] = [
    ReviewStage::RhetoricalAnalysis,
    ReviewStage::CoreMessage,
    ReviewStage::Outline,
    ReviewStage::FinalReview,
];

/// A registry of `len` steps named `step-<i>` / `Agent <i>` where the steps
/// at `gated` indices open review gates.
#[allow(dead_code)]
pub fn registry_with_gates(len: usize, gated: &[usize]) -> StepRegistry {
    let mut stages = STAGES.iter();
    let steps = (0..len)
        .map(|i| {
            let phase = match i {
                i if i + 3 < len => Phase::Research,
                i if i + 1 < len => Phase::Planning,
                _ => Phase::Implementation,
            };
            let step = StepDefinition::new(
                format!("step-{i}"),
                phase,
                format!("Agent {i}"),
                format!("Task {i}"),
            );
            if gated.contains(&i) {
                let stage = stages.next().expect("at most four gated steps");
                step.with_review(*stage)
            } else {
                step
            }
        })
        .collect();
    StepRegistry::new(steps).expect("fixture registry should be valid")
}

/// An engine with zero pacing, a fixed score and `agent` for every role.
#[allow(dead_code)]
pub fn test_engine(
    registry: StepRegistry,
    agent: Arc<dyn Agent>,
) -> (PipelineEngine, mpsc::UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let engine = PipelineEngine::new(registry, AgentManager::new(agent), tx)
        .with_pacing(PacingConfig::immediate())
        .with_scorer(FixedScorer(TEST_SCORE));
    (engine, rx)
}

/// Create a temporary project directory with `.sermon-pipeline` configuration.
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let sp_dir = temp_dir.path().join(".sermon-pipeline");
    std::fs::create_dir_all(sp_dir.join("agents"))?;

    std::fs::write(
        sp_dir.join("config.toml"),
        "[agent]\nmodel = \"mock\"\n\n[pacing]\nstart-delay-ms = 0\nadvance-delay-ms = 0\n",
    )?;

    std::fs::write(
        sp_dir.join("pipeline.yaml"),
        r#"
- id: keyword-expert
  phase: Research
  wave: 1
  agent-name: Keyword Expert
  description: Key term study
- id: outline-architect
  phase: Planning
  agent-name: Outline Designer
  description: Outline
  review: outline
- id: sermon-writer
  phase: Implementation
  agent-name: Sermon Script Writer
  description: Manuscript
"#,
    )?;

    std::fs::write(
        sp_dir.join("agents/outline.md"),
        "---\nname: Outline Designer\ndescription: Outlines\nmodel: mock\n---\nThree points.",
    )?;

    Ok(temp_dir)
}
