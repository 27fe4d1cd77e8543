//! Self-belief (prior) estimation
//!
//! Scores every sentence from its own cues, ignoring neighbours:
//! weighted indicator features plus the sentence's normalized similarity
//! to the cited title and content. Scores are min-max normalized over the
//! non-explicit sentences and floored; explicit references are pinned to
//! certainty and act as seeds for propagation.

use crate::belief::Belief;
use crate::errors::MrfError;
use crate::scaling::MinMax;
use citectx_common::config::SelfBeliefWeights;
use citectx_common::{DatasetContext, Document, Lexicon, TextFeatures};
use tracing::{trace, warn};

/// Priors for one document plus the degenerate-range diagnostics
#[derive(Debug, Clone)]
pub struct PriorEstimate {
    /// One prior per sentence
    pub beliefs: Vec<Belief>,

    /// All cited-work similarities were equal; every sentence got 0.5
    pub similarity_range_degenerate: bool,

    /// All non-explicit scores were equal; every non-explicit prior is 0.5
    pub score_range_degenerate: bool,
}

/// Computes per-sentence priors
pub struct SelfBeliefEstimator<'a> {
    lexicon: &'a Lexicon,
    weights: &'a SelfBeliefWeights,
    min_belief: f64,
}

impl<'a> SelfBeliefEstimator<'a> {
    pub fn new(lexicon: &'a Lexicon, weights: &'a SelfBeliefWeights, min_belief: f64) -> Self {
        Self { lexicon, weights, min_belief }
    }

    /// `sim(content) + 2 * sim(title)` per sentence, min-max normalized
    /// across the document. Returns the scaled values and whether the range
    /// was degenerate.
    pub fn cited_similarities<T: TextFeatures>(
        &self,
        document: &Document<T>,
        context: &DatasetContext<T>,
    ) -> Result<(Vec<f64>, bool), MrfError> {
        let mut raw = Vec::with_capacity(document.len());
        for (i, sentence) in document.sentences.iter().enumerate() {
            let sim = sentence.text.similarity(&context.cited_content)
                + 2.0 * sentence.text.similarity(&context.cited_title);
            if !sim.is_finite() {
                return Err(MrfError::NonFiniteSelfBelief {
                    document: document.id.clone(),
                    sentence: i,
                    score: sim,
                });
            }
            raw.push(sim);
        }

        let Some(range) = MinMax::from_values(raw.iter().copied()) else {
            return Ok((raw, false));
        };

        if range.is_degenerate() {
            return Ok((vec![0.5; raw.len()], true));
        }

        let scaled = raw.iter().filter_map(|&s| range.scale(s)).collect();
        Ok((scaled, false))
    }

    /// Weighted cue features plus the normalized cited similarity
    pub fn unnormalized_score<T: TextFeatures>(
        &self,
        text: &T,
        context: &DatasetContext<T>,
        similar_to_cited: f64,
    ) -> f64 {
        let words = text.raw_words();
        let mut score = similar_to_cited;

        if self.lexicon.contains_main_author(words, &context.cited_main_author) {
            score += self.weights.author;
        }
        if self.lexicon.contains_acronyms(words, &context.acronyms) {
            score += self.weights.acronym;
        }
        if self.lexicon.contains_lexical_hooks(text.raw(), &context.lexical_hooks) {
            score += self.weights.hooks;
        }
        if self.lexicon.starts_with_section_header(words) {
            score += self.weights.header;
        }

        trace!(similarity = similar_to_cited, score, sentence = text.raw(), "Self-belief score");
        score
    }

    /// Priors for every sentence of the document
    pub fn estimate<T: TextFeatures>(
        &self,
        document: &Document<T>,
        context: &DatasetContext<T>,
    ) -> Result<PriorEstimate, MrfError> {
        let (similarities, similarity_range_degenerate) =
            self.cited_similarities(document, context)?;
        if similarity_range_degenerate {
            warn!(document = %document.id, "Cited-work similarity range is empty, using 0.5");
        }

        let mut scores = Vec::with_capacity(document.len());
        for (i, sentence) in document.sentences.iter().enumerate() {
            let score = self.unnormalized_score(&sentence.text, context, similarities[i]);
            if !score.is_finite() {
                return Err(MrfError::NonFiniteSelfBelief {
                    document: document.id.clone(),
                    sentence: i,
                    score,
                });
            }
            scores.push(score);
        }

        // Explicit references would otherwise compress everyone else's range
        let range = MinMax::from_values(
            document
                .sentences
                .iter()
                .zip(&scores)
                .filter(|(s, _)| !s.sentence_type.is_explicit())
                .map(|(_, &score)| score),
        );
        let score_range_degenerate = range.is_some_and(|r| r.is_degenerate());
        if score_range_degenerate {
            warn!(
                document = %document.id,
                score = range.map(|r| r.max).unwrap_or_default(),
                "Self-belief range is empty, using 0.5"
            );
        }

        let beliefs = document
            .sentences
            .iter()
            .zip(&scores)
            .map(|(sentence, &score)| {
                if sentence.sentence_type.is_explicit() {
                    return Belief::CERTAIN_REFERENCE;
                }
                let normalized = range.and_then(|r| r.scale(score)).unwrap_or(0.5);
                Belief::from_reference_probability(normalized.max(self.min_belief))
            })
            .collect();

        Ok(PriorEstimate {
            beliefs,
            similarity_range_degenerate,
            score_range_degenerate,
        })
    }
}
