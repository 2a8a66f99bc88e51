//! Scoring predicted answers against reference answers.
//!
//! Plain single-label classification metrics: per-label precision, recall
//! and F1, their macro averages, and micro/accuracy. Nothing here knows
//! about questions; it scores any pair of equal-length label sequences.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Precision/recall/F1 for one label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelMetrics {
    /// Fraction of predictions of this label that were correct.
    pub precision: f64,

    /// Fraction of references of this label that were found.
    pub recall: f64,

    /// Harmonic mean of precision and recall.
    pub f1: f64,

    /// Number of references carrying this label.
    pub support: usize,
}

/// A full scoring report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Fraction of predictions equal to their reference.
    pub accuracy: f64,

    /// Unweighted mean of per-label precision.
    pub macro_precision: f64,

    /// Unweighted mean of per-label recall.
    pub macro_recall: f64,

    /// Unweighted mean of per-label F1.
    pub macro_f1: f64,

    /// Pooled precision/recall/F1. For single-label classification all
    /// three equal the accuracy.
    pub micro_f1: f64,

    /// Per-label breakdown, keyed by label, sorted.
    pub per_label: BTreeMap<String, LabelMetrics>,
}

/// Scores predictions against references.
///
/// The label set is the union of both sequences, so a hallucinated
/// prediction label shows up with zero support rather than disappearing.
///
/// # Errors
///
/// Returns [`PipelineError::ScoringLengthMismatch`] when the sequences
/// differ in length.
pub fn score(predictions: &[&str], references: &[&str]) -> Result<Evaluation, PipelineError> {
    if predictions.len() != references.len() {
        return Err(PipelineError::ScoringLengthMismatch {
            predictions: predictions.len(),
            references: references.len(),
        });
    }

    let labels: BTreeSet<&str> = predictions.iter().chain(references).copied().collect();
    let total = references.len();
    let correct = predictions
        .iter()
        .zip(references)
        .filter(|(p, r)| p == r)
        .count();
    let accuracy = if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    };

    let mut per_label = BTreeMap::new();
    for label in labels {
        let tp = predictions
            .iter()
            .zip(references)
            .filter(|(p, r)| **p == label && **r == label)
            .count();
        let predicted = predictions.iter().filter(|p| **p == label).count();
        let support = references.iter().filter(|r| **r == label).count();

        let precision = ratio(tp, predicted);
        let recall = ratio(tp, support);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        per_label.insert(
            label.to_string(),
            LabelMetrics {
                precision,
                recall,
                f1,
                support,
            },
        );
    }

    let count = per_label.len().max(1) as f64;
    let macro_precision = per_label.values().map(|m| m.precision).sum::<f64>() / count;
    let macro_recall = per_label.values().map(|m| m.recall).sum::<f64>() / count;
    let macro_f1 = per_label.values().map(|m| m.f1).sum::<f64>() / count;

    Ok(Evaluation {
        accuracy,
        macro_precision,
        macro_recall,
        macro_f1,
        micro_f1: accuracy,
        per_label,
    })
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
