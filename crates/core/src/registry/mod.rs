//! Step registry.
//!
//! The registry is the ordered, immutable catalog of [`StepDefinition`]s a
//! pipeline runs through. Registry order is the dependency order: a step may
//! only consume the results of steps with a lower index.

use sp_protocol::step_models::{Phase, ReviewStage, StepDefinition};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised when a registry violates its structural rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("A pipeline needs at least one step")]
    Empty,

    #[error("Duplicate step id '{0}'")]
    DuplicateId(String),

    #[error("Step '{id}' has wave {wave}; waves must be >= 1 and only apply to Research steps")]
    InvalidWave { id: String, wave: u8 },

    #[error("Step '{0}' cannot use the initial-approval stage; it is opened by the pipeline start")]
    ReservedStage(String),

    #[error("Review stage {stage} is assigned to both '{first}' and '{second}'")]
    DuplicateStage {
        stage: ReviewStage,
        first: String,
        second: String,
    },
}

/// Ordered, immutable, cheaply clonable catalog of pipeline steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRegistry {
    steps: Arc<[StepDefinition]>,
}

impl StepRegistry {
    /// Build a registry from step definitions, validating ids, waves and stages.
    pub fn new(steps: Vec<StepDefinition>) -> Result<Self, RegistryError> {
        if steps.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut ids = HashSet::new();
        let mut stages: Vec<(ReviewStage, &str)> = Vec::new();

        for step in &steps {
            if !ids.insert(step.id.as_str()) {
                return Err(RegistryError::DuplicateId(step.id.clone()));
            }

            if let Some(wave) = step.wave {
                if wave == 0 || step.phase != Phase::Research {
                    return Err(RegistryError::InvalidWave {
                        id: step.id.clone(),
                        wave,
                    });
                }
            }

            if let Some(stage) = step.review {
                if stage == ReviewStage::InitialApproval {
                    return Err(RegistryError::ReservedStage(step.id.clone()));
                }
                if let Some((_, first)) = stages.iter().find(|(s, _)| *s == stage) {
                    return Err(RegistryError::DuplicateStage {
                        stage,
                        first: (*first).to_string(),
                        second: step.id.clone(),
                    });
                }
                stages.push((stage, step.id.as_str()));
            }
        }

        Ok(Self {
            steps: steps.into(),
        })
    }

    /// The built-in fifteen-step sermon preparation catalog.
    pub fn sermon() -> Self {
        Self {
            steps: sermon_steps().into(),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StepDefinition> {
        self.steps.get(index)
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.iter()
    }

    /// Index of the step with the given id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }

    /// Indices of the steps that open a review gate on completion.
    pub fn gated_indices(&self) -> Vec<usize> {
        self.steps
            .iter()
            .enumerate()
            .filter(|(_, s)| s.requires_hitl())
            .map(|(i, _)| i)
            .collect()
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::sermon()
    }
}

fn research(id: &str, wave: u8, agent: &str, description: &str) -> StepDefinition {
    StepDefinition::new(id, Phase::Research, agent, description).with_wave(wave)
}

fn sermon_steps() -> Vec<StepDefinition> {
    vec![
        // Wave 1: foundation
        research(
            "original-text",
            1,
            "Original Text Analyst",
            "Original-language vocabulary, grammar and syntax analysis",
        ),
        research(
            "manuscript-comp",
            1,
            "Manuscript Comparator",
            "Comparison of manuscripts and translations and their differences",
        ),
        research(
            "biblical-geo",
            1,
            "Biblical Geography Expert",
            "Biblical geography and city layout analysis",
        ),
        research(
            "hist-cultural",
            1,
            "Historical-Cultural Expert",
            "Historical, cultural and period background",
        ),
        // Wave 2: deep structure
        research(
            "struct-analyst",
            2,
            "Structure Analyst",
            "Paragraph division and flow of argument",
        ),
        research(
            "parallel-passage",
            2,
            "Parallel Passage Analyst",
            "Parallel passages and intertextuality",
        ),
        research(
            "keyword-expert",
            2,
            "Keyword Expert",
            "Key term study and theological usage",
        ),
        // Wave 3: theological integration
        research(
            "theo-analyst",
            3,
            "Theological Analyst",
            "Theological themes and Christ-centred analysis",
        ),
        research(
            "literary-analyst",
            3,
            "Literary Analyst",
            "Genre analysis and literary devices",
        ),
        research(
            "hist-context",
            3,
            "Historical Context Analyst",
            "Historical and canonical context",
        ),
        // Wave 4: synthesis
        research(
            "rhetoric-analyst",
            4,
            "Rhetorical Analyst",
            "Rhetorical analysis and persuasion strategy",
        )
        .with_review(ReviewStage::RhetoricalAnalysis),
        StepDefinition::new(
            "message-synth",
            Phase::Planning,
            "Core Message Architect",
            "Core message (big idea) and main points",
        )
        .with_review(ReviewStage::CoreMessage),
        StepDefinition::new(
            "outline-architect",
            Phase::Planning,
            "Outline Designer",
            "Sermon outline and flow design",
        )
        .with_review(ReviewStage::Outline),
        StepDefinition::new(
            "sermon-writer",
            Phase::Implementation,
            "Sermon Script Writer",
            "Full manuscript in the requested style",
        ),
        StepDefinition::new(
            "sermon-reviewer",
            Phase::Implementation,
            "Sermon Reviewer",
            "Final review and quality assessment",
        )
        .with_review(ReviewStage::FinalReview),
    ]
}
