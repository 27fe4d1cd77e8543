//! Metrics and observability utilities
//!
//! Records classifier metrics through the `metrics` facade. Installing an
//! exporter is left to the embedding binary; without one every call is a
//! no-op.

use metrics::{
    counter, describe_counter, describe_histogram, histogram, Unit,
};
use std::time::Instant;

/// Metrics prefix for all CiteCtx metrics
pub const METRICS_PREFIX: &str = "citectx";

/// Register all metric descriptions
pub fn register_metrics() {
    // Document metrics
    describe_counter!(
        format!("{}_documents_classified_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of documents classified"
    );

    describe_counter!(
        format!("{}_document_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Documents whose classification was aborted"
    );

    describe_histogram!(
        format!("{}_inference_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Per-document inference latency in seconds"
    );

    describe_histogram!(
        format!("{}_inference_sweeps", METRICS_PREFIX),
        Unit::Count,
        "Belief propagation sweeps executed per document"
    );

    describe_counter!(
        format!("{}_inference_converged_total", METRICS_PREFIX),
        Unit::Count,
        "Documents whose messages settled before the sweep budget ran out"
    );

    // Numerical diagnostics
    describe_counter!(
        format!("{}_degenerate_normalizations_total", METRICS_PREFIX),
        Unit::Count,
        "Min-max scalings with an empty range and zero-sum probability vectors"
    );

    // Relatedness cache
    describe_counter!(
        format!("{}_relatedness_cache_hits_total", METRICS_PREFIX),
        Unit::Count,
        "Relatedness lookups served from the per-document cache"
    );

    describe_counter!(
        format!("{}_relatedness_cache_misses_total", METRICS_PREFIX),
        Unit::Count,
        "Relatedness lookups that computed a similarity"
    );

    // Outcomes
    describe_counter!(
        format!("{}_predictions_total", METRICS_PREFIX),
        Unit::Count,
        "Scored sentences by confusion-matrix outcome"
    );

    // Corpus
    describe_counter!(
        format!("{}_corpus_runs_total", METRICS_PREFIX),
        Unit::Count,
        "Completed corpus runs, labelled by whether any document failed"
    );

    describe_histogram!(
        format!("{}_corpus_documents", METRICS_PREFIX),
        Unit::Count,
        "Documents classified per corpus run"
    );

    describe_histogram!(
        format!("{}_corpus_f1", METRICS_PREFIX),
        Unit::Count,
        "F1 score of a completed corpus run"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record per-document inference metrics
pub struct DocumentMetrics {
    start: Instant,
    dataset: String,
}

impl DocumentMetrics {
    /// Start tracking a document
    pub fn start(dataset: &str) -> Self {
        Self {
            start: Instant::now(),
            dataset: dataset.to_string(),
        }
    }

    /// Elapsed time so far in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Record document completion
    pub fn finish(self, sweeps: usize, converged: bool) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_documents_classified_total", METRICS_PREFIX),
            "dataset" => self.dataset.clone()
        )
        .increment(1);

        histogram!(
            format!("{}_inference_duration_seconds", METRICS_PREFIX),
            "dataset" => self.dataset.clone()
        )
        .record(duration);

        histogram!(
            format!("{}_inference_sweeps", METRICS_PREFIX)
        )
        .record(sweeps as f64);

        if converged {
            counter!(
                format!("{}_inference_converged_total", METRICS_PREFIX),
                "dataset" => self.dataset
            )
            .increment(1);
        }
    }
}

/// Helper to record an aborted document
pub fn record_document_failure(dataset: &str, code: &str) {
    counter!(
        format!("{}_document_failures_total", METRICS_PREFIX),
        "dataset" => dataset.to_string(),
        "code" => code.to_string()
    )
    .increment(1);
}

/// Helper to record a degenerate normalization fallback
pub fn record_degenerate_normalization(kind: &str) {
    counter!(
        format!("{}_degenerate_normalizations_total", METRICS_PREFIX),
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Helper to record relatedness cache usage for one document
pub fn record_relatedness_cache(hits: u64, misses: u64) {
    counter!(
        format!("{}_relatedness_cache_hits_total", METRICS_PREFIX)
    )
    .increment(hits);

    counter!(
        format!("{}_relatedness_cache_misses_total", METRICS_PREFIX)
    )
    .increment(misses);
}

/// Helper to record confusion-matrix counts for one document
pub fn record_predictions(
    true_positives: usize,
    false_positives: usize,
    true_negatives: usize,
    false_negatives: usize,
) {
    for (outcome, count) in [
        ("true_positive", true_positives),
        ("false_positive", false_positives),
        ("true_negative", true_negatives),
        ("false_negative", false_negatives),
    ] {
        counter!(
            format!("{}_predictions_total", METRICS_PREFIX),
            "outcome" => outcome
        )
        .increment(count as u64);
    }
}

/// Helper to record a completed corpus run
pub fn record_corpus(label: &str, documents: usize, failures: usize, f1: f64) {
    counter!(
        format!("{}_corpus_runs_total", METRICS_PREFIX),
        "dataset" => label.to_string(),
        "complete" => (failures == 0).to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_corpus_documents", METRICS_PREFIX),
        "dataset" => label.to_string()
    )
    .record(documents as f64);

    histogram!(
        format!("{}_corpus_f1", METRICS_PREFIX),
        "dataset" => label.to_string()
    )
    .record(f1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_metrics() {
        let metrics = DocumentMetrics::start("J96-2004");
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(metrics.elapsed_ms() >= 5);
        metrics.finish(3, true);
        // Just verify it runs without panic
    }

    #[test]
    fn test_recorders_without_exporter() {
        register_metrics();
        record_document_failure("W02-1011", "NON_FINITE_SELF_BELIEF");
        record_degenerate_normalization("self_belief");
        record_relatedness_cache(10, 4);
        record_predictions(1, 2, 3, 4);
        record_corpus("P02-1053", 7, 1, 0.42);
    }
}
