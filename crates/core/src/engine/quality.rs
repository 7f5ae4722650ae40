//! Final quality scoring.

use rand::Rng;
use sp_protocol::session_models::SessionState;
use sp_protocol::step_models::StepDefinition;

/// Lowest score the placeholder can produce.
pub const MIN_SCORE: f64 = 4.5;
/// Highest score the placeholder can produce.
pub const MAX_SCORE: f64 = 5.0;

/// Computes the score stored when a run reaches completion.
pub trait QualityScorer: Send + Sync {
    fn score(&self, steps: &[StepDefinition], session: &SessionState) -> f64;
}

/// Placeholder scorer: a pseudo-random value in `[4.5, 5.0]`, rounded to
/// one decimal. It does not read any step output.
///
/// A real implementation should derive the score from the final review
/// step's result.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderScorer;

impl QualityScorer for PlaceholderScorer {
    fn score(&self, _steps: &[StepDefinition], _session: &SessionState) -> f64 {
        let raw = rand::thread_rng().gen_range(MIN_SCORE..=MAX_SCORE);
        ((raw * 10.0).round() / 10.0).clamp(MIN_SCORE, MAX_SCORE)
    }
}

/// Scorer that always returns the same value.
#[derive(Debug, Clone, Copy)]
pub struct FixedScorer(pub f64);

impl QualityScorer for FixedScorer {
    fn score(&self, _steps: &[StepDefinition], _session: &SessionState) -> f64 {
        self.0
    }
}
