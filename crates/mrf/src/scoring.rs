//! Decision rule and confusion-matrix accounting

use crate::belief::Belief;
use crate::propagation::InferenceOutcome;
use citectx_common::{Document, SentenceType};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Confusion matrix for one document or an aggregate of documents.
/// Implicit references are the positive class; explicit references are
/// never counted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,

    /// Sentence positions predicted as references that are not
    pub fp_indices: Vec<usize>,

    /// Implicit references the classifier missed
    pub fn_indices: Vec<usize>,

    /// Wall-clock inference time
    pub elapsed_ms: u64,
}

impl ClassificationResult {
    /// Count one scored sentence
    pub fn add(&mut self, position: usize, predicted: bool, actual: bool) {
        match (predicted, actual) {
            (true, true) => self.true_positives += 1,
            (true, false) => {
                self.false_positives += 1;
                self.fp_indices.push(position);
            }
            (false, false) => self.true_negatives += 1,
            (false, true) => {
                self.false_negatives += 1;
                self.fn_indices.push(position);
            }
        }
    }

    /// Add another result's counts and timing to this one
    pub fn merge(&mut self, other: &ClassificationResult) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.true_negatives += other.true_negatives;
        self.false_negatives += other.false_negatives;
        self.fp_indices.extend_from_slice(&other.fp_indices);
        self.fn_indices.extend_from_slice(&other.fn_indices);
        self.elapsed_ms += other.elapsed_ms;
    }

    /// Number of scored sentences
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// Weighted harmonic mean of precision and recall; 0 when both are 0
    pub fn f_score(&self, beta: f64) -> f64 {
        let p = self.precision();
        let r = self.recall();
        let b2 = beta * beta;
        let denominator = b2 * p + r;
        if denominator == 0.0 {
            0.0
        } else {
            (1.0 + b2) * p * r / denominator
        }
    }

    pub fn f1(&self) -> f64 {
        self.f_score(1.0)
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TP: {} FP: {} TN: {} FN: {} | precision {:.4} recall {:.4} F1 {:.4} accuracy {:.4} ({} ms)",
            self.true_positives,
            self.false_positives,
            self.true_negatives,
            self.false_negatives,
            self.precision(),
            self.recall(),
            self.f1(),
            self.accuracy(),
            self.elapsed_ms
        )
    }
}

/// A sentence is predicted to be a reference iff its final REFERENCE
/// belief exceeds `threshold` and it lies within `context_window`
/// positions (inclusive) of an explicit reference.
pub fn predict<T>(
    beliefs: &[Belief],
    document: &Document<T>,
    threshold: f64,
    context_window: usize,
) -> Vec<bool> {
    let explicit = document.explicit_positions();

    beliefs
        .iter()
        .enumerate()
        .map(|(i, belief)| {
            belief.reference() > threshold
                && explicit.iter().any(|&e| i.abs_diff(e) <= context_window)
        })
        .collect()
}

/// Score the predictions of one document, skipping explicit references
pub fn score_document<T>(
    document: &Document<T>,
    outcome: &InferenceOutcome,
    predictions: &[bool],
) -> ClassificationResult {
    let mut result = ClassificationResult::default();

    for (i, sentence) in document.sentences.iter().enumerate() {
        let actual = match sentence.sentence_type {
            SentenceType::ExplicitReference => continue,
            SentenceType::ImplicitReference => true,
            SentenceType::NotReference => false,
        };
        let predicted = predictions[i];
        result.add(i, predicted, actual);

        if actual && !predicted {
            log_missed_reference(document, outcome, i);
        }
    }

    result
}

fn log_missed_reference<T>(document: &Document<T>, outcome: &InferenceOutcome, position: usize) {
    let belief = outcome.beliefs[position].reference();
    match position.checked_sub(1) {
        Some(previous) => debug!(
            document = %document.id,
            position,
            belief,
            previous_type = ?document.sentence_type(previous),
            previous_self_belief = outcome.self_beliefs[previous].reference(),
            previous_belief = outcome.beliefs[previous].reference(),
            "Missed implicit reference"
        ),
        None => debug!(document = %document.id, position, belief, "Missed implicit reference"),
    }
}

/// Classification of one citing document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentClassification {
    pub document_id: String,
    pub self_beliefs: Vec<Belief>,
    pub beliefs: Vec<Belief>,
    pub predictions: Vec<bool>,
    pub sweeps: usize,
    pub converged: bool,
    pub result: ClassificationResult,
}

/// A document whose classification was aborted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub dataset: String,
    pub document_id: String,
    pub code: String,
    pub message: String,
}

/// Aggregate over every document of one or more datasets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusResult {
    pub totals: ClassificationResult,
    pub documents: Vec<DocumentClassification>,
    pub failures: Vec<DocumentFailure>,
}

impl CorpusResult {
    pub fn push_document(&mut self, document: DocumentClassification) {
        self.totals.merge(&document.result);
        self.documents.push(document);
    }

    pub fn push_failure(&mut self, failure: DocumentFailure) {
        self.failures.push(failure);
    }

    pub fn merge(&mut self, other: CorpusResult) {
        for document in other.documents {
            self.push_document(document);
        }
        self.failures.extend(other.failures);
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
