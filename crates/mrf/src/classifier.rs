//! Classifier facade
//!
//! Ties prior estimation, relatedness, propagation and scoring together
//! for single documents and whole datasets.

use crate::errors::MrfError;
use crate::propagation::{BeliefPropagation, InferenceOutcome, PropagationConfig, WindowGraph};
use crate::relatedness::RelatednessModel;
use crate::scoring::{
    predict, score_document, CorpusResult, DocumentClassification, DocumentFailure,
};
use crate::self_belief::SelfBeliefEstimator;
use citectx_common::metrics::{
    record_corpus, record_degenerate_normalization, record_document_failure,
    record_predictions, record_relatedness_cache, DocumentMetrics,
};
use citectx_common::{AppConfig, Dataset, DatasetContext, Document, Lexicon, TextFeatures};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Citation context classifier
///
/// Cheap to clone: configuration and lexicon are shared.
#[derive(Clone)]
pub struct MrfClassifier {
    config: Arc<AppConfig>,
    lexicon: Arc<Lexicon>,
}

impl MrfClassifier {
    /// Validate the configuration and build a classifier. Fails before any
    /// document is touched if a parameter is out of range.
    pub fn new(config: &AppConfig, lexicon: Arc<Lexicon>) -> Result<Self, MrfError> {
        config
            .ensure_valid()
            .map_err(|e| MrfError::InvalidConfiguration(e.to_string()))?;

        Ok(Self {
            config: Arc::new(config.clone()),
            lexicon,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn metrics_enabled(&self) -> bool {
        self.config.observability.metrics_enabled
    }

    /// Priors plus belief propagation for one document
    pub fn infer<T: TextFeatures>(
        &self,
        document: &Document<T>,
        context: &DatasetContext<T>,
    ) -> Result<InferenceOutcome, MrfError> {
        let mrf = &self.config.mrf;

        let estimator =
            SelfBeliefEstimator::new(&self.lexicon, &self.config.self_belief, mrf.min_belief);
        let prior = estimator.estimate(document, context)?;

        let graph = WindowGraph::new(document.len(), mrf.neighbourhood);
        let mut relatedness = RelatednessModel::new(
            document,
            &self.lexicon,
            &self.config.relatedness,
            mrf.neighbourhood,
        );

        let engine = BeliefPropagation::new(
            &graph,
            PropagationConfig {
                max_iterations: mrf.max_iterations,
                delta: mrf.delta,
            },
        );
        let outcome = engine.run(&prior.beliefs, &mut relatedness);

        let (hits, misses) = relatedness.cache_stats();
        debug!(
            document = %document.id,
            edges = graph.edge_count(),
            cache_hits = hits,
            cache_misses = misses,
            "Relatedness cache usage"
        );

        if self.metrics_enabled() {
            record_relatedness_cache(hits, misses);
            if prior.similarity_range_degenerate {
                record_degenerate_normalization("cited_similarity");
            }
            if prior.score_range_degenerate {
                record_degenerate_normalization("self_belief");
            }
            if relatedness.similarity_range_degenerate() {
                record_degenerate_normalization("relatedness");
            }
        }

        Ok(outcome)
    }

    /// Infer, decide and score one citing document
    #[instrument(skip_all, fields(dataset = %label, document = %document.id, sentences = document.len()))]
    pub fn classify_document<T: TextFeatures>(
        &self,
        label: &str,
        document: &Document<T>,
        context: &DatasetContext<T>,
    ) -> Result<DocumentClassification, MrfError> {
        let timer = DocumentMetrics::start(label);

        let outcome = self.infer(document, context)?;
        let predictions = predict(
            &outcome.beliefs,
            document,
            self.config.mrf.belief_threshold,
            self.config.mrf.context_window,
        );

        let mut result = score_document(document, &outcome, &predictions);
        result.elapsed_ms = timer.elapsed_ms();

        debug!(
            sweeps = outcome.sweeps,
            converged = outcome.converged,
            tp = result.true_positives,
            fp = result.false_positives,
            tn = result.true_negatives,
            fn_ = result.false_negatives,
            "Document classified"
        );

        if self.metrics_enabled() {
            record_predictions(
                result.true_positives,
                result.false_positives,
                result.true_negatives,
                result.false_negatives,
            );
            timer.finish(outcome.sweeps, outcome.converged);
        }

        Ok(DocumentClassification {
            document_id: document.id.clone(),
            self_beliefs: outcome.self_beliefs,
            beliefs: outcome.beliefs,
            predictions,
            sweeps: outcome.sweeps,
            converged: outcome.converged,
            result,
        })
    }

    fn record_outcome(
        &self,
        corpus: &mut CorpusResult,
        label: &str,
        document_id: &str,
        outcome: Result<DocumentClassification, MrfError>,
    ) {
        match outcome {
            Ok(classification) => corpus.push_document(classification),
            Err(e) => {
                warn!(
                    dataset = %label,
                    document = %document_id,
                    code = e.code(),
                    error = %e,
                    "Document classification aborted, skipping"
                );
                if self.metrics_enabled() {
                    record_document_failure(label, e.code());
                }
                corpus.push_failure(DocumentFailure {
                    dataset: label.to_string(),
                    document_id: document_id.to_string(),
                    code: e.code().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    fn finish_corpus(&self, label: &str, corpus: &CorpusResult) {
        info!(
            dataset = %label,
            documents = corpus.documents.len(),
            failures = corpus.failures.len(),
            precision = corpus.totals.precision(),
            recall = corpus.totals.recall(),
            f1 = corpus.totals.f1(),
            "Dataset classified"
        );
        if self.metrics_enabled() {
            record_corpus(label, corpus.documents.len(), corpus.failures.len(), corpus.totals.f1());
        }
    }

    /// Classify every citing document of a dataset, one after another
    #[instrument(skip_all, fields(
        dataset = %dataset.label,
        documents = dataset.citers.len(),
        sentences = dataset.sentence_count()
    ))]
    pub fn classify_dataset<T: TextFeatures>(&self, dataset: &Dataset<T>) -> CorpusResult {
        info!("Classifying dataset");

        let mut corpus = CorpusResult::default();
        for document in &dataset.citers {
            let outcome = self.classify_document(&dataset.label, document, &dataset.context);
            self.record_outcome(&mut corpus, &dataset.label, &document.id, outcome);
        }

        self.finish_corpus(&dataset.label, &corpus);
        corpus
    }

    /// Classify documents on the blocking pool, at most
    /// `corpus.max_concurrent_documents` at a time. Results keep document
    /// order.
    #[instrument(skip_all, fields(
        dataset = %dataset.label,
        documents = dataset.citers.len(),
        sentences = dataset.sentence_count()
    ))]
    pub async fn classify_dataset_concurrent<T>(&self, dataset: Arc<Dataset<T>>) -> CorpusResult
    where
        T: TextFeatures + 'static,
    {
        let limit = self.config.corpus.max_concurrent_documents;
        info!(max_concurrent = limit, "Classifying dataset concurrently");

        let tasks = (0..dataset.citers.len()).map(|position| {
            let classifier = self.clone();
            let dataset = Arc::clone(&dataset);
            tokio::task::spawn_blocking(move || {
                let document = &dataset.citers[position];
                classifier.classify_document(&dataset.label, document, &dataset.context)
            })
        });

        let outcomes: Vec<_> = stream::iter(tasks).buffered(limit).collect().await;

        let mut corpus = CorpusResult::default();
        for (document, joined) in dataset.citers.iter().zip(outcomes) {
            let outcome = joined.unwrap_or_else(|e| {
                error!(document = %document.id, error = %e, "Classification task did not complete");
                Err(MrfError::from(e))
            });
            self.record_outcome(&mut corpus, &dataset.label, &document.id, outcome);
        }

        self.finish_corpus(&dataset.label, &corpus);
        corpus
    }

    /// Classify several datasets (one per cited work) into one aggregate
    pub fn classify_datasets<T: TextFeatures>(&self, datasets: &[Dataset<T>]) -> CorpusResult {
        let mut corpus = CorpusResult::default();
        for dataset in datasets {
            corpus.merge(self.classify_dataset(dataset));
        }

        info!(
            version = citectx_common::VERSION,
            datasets = datasets.len(),
            documents = corpus.documents.len(),
            failures = corpus.failures.len(),
            summary = %corpus.totals,
            "Corpus classified"
        );
        corpus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citectx_common::{BagOfWords, SentenceType};
    use std::collections::HashSet;

    fn context() -> DatasetContext<BagOfWords> {
        DatasetContext::new(
            "Collins",
            BagOfWords::new("Discriminative training methods for hidden Markov models"),
            BagOfWords::new("perceptron training for tagging with hidden Markov models"),
            ["HMM".to_string()].into_iter().collect(),
            HashSet::new(),
        )
    }

    fn dataset() -> Dataset<BagOfWords> {
        use SentenceType::*;
        let citer = Document::new(
            "W03-0402",
            vec![
                (NotReference, BagOfWords::new("We study part of speech tagging.")),
                (ExplicitReference, BagOfWords::new("Collins (2002) trains an HMM tagger with the perceptron.")),
                (ImplicitReference, BagOfWords::new("This method uses averaged parameters.")),
                (NotReference, BagOfWords::new("Our corpus contains news text.")),
            ],
        );
        Dataset::new("W02-1001", context(), vec![citer])
    }

    #[test]
    fn test_invalid_configuration_is_fatal() {
        let mut config = AppConfig::default();
        config.mrf.max_iterations = 0;

        let err = MrfClassifier::new(&config, Arc::new(Lexicon::default()))
            .err()
            .expect("zero sweep budget must be rejected");
        assert!(err.is_fatal());
    }

    #[test]
    fn test_classify_dataset() {
        let classifier = MrfClassifier::new(&AppConfig::default(), Arc::new(Lexicon::default())).unwrap();
        let corpus = classifier.classify_dataset(&dataset());

        assert!(corpus.is_complete());
        assert_eq!(corpus.documents.len(), 1);
        // Explicit sentence is not scored
        assert_eq!(corpus.totals.total(), 3);

        let document = &corpus.documents[0];
        assert_eq!(document.beliefs.len(), 4);
        assert!(document.sweeps <= classifier.config().mrf.max_iterations);
    }

    #[test]
    fn test_classify_datasets_aggregates() {
        let classifier = MrfClassifier::new(&AppConfig::default(), Arc::new(Lexicon::default())).unwrap();
        let single = classifier.classify_dataset(&dataset());
        let double = classifier.classify_datasets(&[dataset(), dataset()]);

        assert_eq!(double.documents.len(), 2);
        assert_eq!(double.totals.total(), 2 * single.totals.total());
        assert_eq!(double.totals.true_positives, 2 * single.totals.true_positives);
    }

    #[test]
    fn test_concurrent_matches_sequential() {
        let classifier = MrfClassifier::new(&AppConfig::default(), Arc::new(Lexicon::default())).unwrap();
        let data = dataset();
        let sequential = classifier.classify_dataset(&data);
        let concurrent = tokio_test::block_on(classifier.classify_dataset_concurrent(Arc::new(data)));

        assert_eq!(concurrent.documents.len(), 1);
        assert_eq!(concurrent.documents[0].beliefs, sequential.documents[0].beliefs);
        assert_eq!(concurrent.documents[0].predictions, sequential.documents[0].predictions);
        assert_eq!(concurrent.totals.total(), sequential.totals.total());
    }
}
