//! Question downsampling.
//!
//! Two annotation states dominate any transcript: full joint acceptance
//! (CT+, CT+, JA, JA) and the pre-introduction state (NB, NB, NA, NA).
//! Questions from those states are kept at a fixed ratio, sampled with an
//! explicit seed so runs are reproducible. Everything else passes through
//! untouched, in order.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::PipelineError;
use crate::label::{BeliefLabel, CommonGroundLabel};
use crate::question::Question;

/// Downsampling configuration with an injectable seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerConfig {
    /// Fraction of overrepresented-state questions to keep.
    pub keep_ratio: f64,

    /// Seed for the sampling RNG.
    pub seed: u64,
}

impl SamplerConfig {
    /// Creates a configuration, validating the ratio.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::KeepRatioOutOfRange`] unless
    /// `0.0 < keep_ratio <= 1.0`.
    pub fn new(keep_ratio: f64, seed: u64) -> Result<Self, PipelineError> {
        if !(keep_ratio > 0.0 && keep_ratio <= 1.0) {
            return Err(PipelineError::KeepRatioOutOfRange { ratio: keep_ratio });
        }
        Ok(Self { keep_ratio, seed })
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            keep_ratio: 0.1,
            seed: 17,
        }
    }
}

/// The two "nothing interesting happening" annotation states.
fn is_overrepresented(question: &Question) -> bool {
    let state = (
        question.belief_a,
        question.belief_b,
        question.cg_a,
        question.cg_b,
    );
    state
        == (
            BeliefLabel::CertainTrue,
            BeliefLabel::CertainTrue,
            CommonGroundLabel::JointlyAccepted,
            CommonGroundLabel::JointlyAccepted,
        )
        || state
            == (
                BeliefLabel::NoBelief,
                BeliefLabel::NoBelief,
                CommonGroundLabel::NotAnnotated,
                CommonGroundLabel::NotAnnotated,
            )
}

/// Downsamples overrepresented questions, preserving input order.
#[must_use]
pub fn downsample(questions: Vec<Question>, config: &SamplerConfig) -> Vec<Question> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    questions
        .into_iter()
        .filter(|q| !is_overrepresented(q) || rng.gen_bool(config.keep_ratio))
        .collect()
}
