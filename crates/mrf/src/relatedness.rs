//! Pairwise relatedness and compatibility potentials
//!
//! relatedness(i, j) = text similarity min-max scaled over every edge of
//! the document's window graph, plus an adjacency bonus when the sentences
//! are neighbours. The bonus is chosen from the later sentence's opening
//! cues, first matching rule only.

use crate::belief::{Belief, State};
use crate::scaling::MinMax;
use citectx_common::config::RelatednessWeights;
use citectx_common::{Document, Lexicon, TextFeatures};
use tracing::debug;

/// Logistic sigmoid
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Memoized relatedness for one document's inference run
pub struct RelatednessModel<'a, T> {
    document: &'a Document<T>,
    lexicon: &'a Lexicon,
    weights: &'a RelatednessWeights,
    neighbourhood: usize,

    /// Similarity of every windowed pair, by slot
    similarities: Vec<f64>,

    /// Range of `similarities`
    range: Option<MinMax>,

    /// `None` until the pair's relatedness has been computed
    cache: Vec<Option<f64>>,

    hits: u64,
    misses: u64,
}

impl<'a, T: TextFeatures> RelatednessModel<'a, T> {
    /// Precompute windowed similarities and their range
    pub fn new(
        document: &'a Document<T>,
        lexicon: &'a Lexicon,
        weights: &'a RelatednessWeights,
        neighbourhood: usize,
    ) -> Self {
        let n = document.len();
        // A radius past the document length connects every pair anyway
        let neighbourhood = neighbourhood.min(n.saturating_sub(1));
        let slots = n * neighbourhood;
        let mut similarities = vec![0.0; slots];

        for i in 0..n {
            let right = (i + neighbourhood).min(n.saturating_sub(1));
            for j in (i + 1)..=right {
                let sim = document.sentences[i].text.similarity(&document.sentences[j].text);
                similarities[i * neighbourhood + (j - i - 1)] = sim;
            }
        }

        let range = MinMax::from_values(
            (0..n).flat_map(|i| {
                let right = (i + neighbourhood).min(n.saturating_sub(1));
                ((i + 1)..=right).map(move |j| (i, j))
            })
            .map(|(i, j)| similarities[i * neighbourhood + (j - i - 1)]),
        );

        if range.is_some_and(|r| r.is_degenerate()) {
            debug!(document = %document.id, "Neighbour similarity range is empty, using 0.5");
        }

        Self {
            document,
            lexicon,
            weights,
            neighbourhood,
            similarities,
            range,
            cache: vec![None; slots],
            hits: 0,
            misses: 0,
        }
    }

    /// Slot of an unordered pair inside the window
    fn slot(&self, a: usize, b: usize) -> Option<usize> {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let distance = hi - lo;
        if distance == 0 || distance > self.neighbourhood || hi >= self.document.len() {
            return None;
        }
        Some(lo * self.neighbourhood + (distance - 1))
    }

    /// Bonus for a pair of neighbours, judged on the later sentence
    pub fn adjacency_bonus(&self, later: &T) -> f64 {
        let words = later.raw_words();
        if self.lexicon.starts_with_connector(words) {
            self.weights.connector
        } else if self.lexicon.contains_det_work(words) {
            self.weights.det_work
        } else if self.lexicon.starts_with_third_person_pronoun(words) {
            self.weights.pronoun
        } else if self.lexicon.starts_with_it(words) || self.lexicon.starts_with_det(words) {
            self.weights.determiner
        } else {
            self.weights.adjacent
        }
    }

    fn compute(&self, a: usize, b: usize, similarity: f64) -> f64 {
        let normalized = self
            .range
            .and_then(|r| r.scale(similarity))
            .unwrap_or(0.5);

        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        if hi == lo + 1 {
            normalized + self.adjacency_bonus(&self.document.sentences[hi].text)
        } else {
            normalized
        }
    }

    /// Symmetric relatedness of two positions. Pairs outside the window are
    /// computed on demand and not cached.
    pub fn relatedness(&mut self, a: usize, b: usize) -> f64 {
        let Some(slot) = self.slot(a, b) else {
            let sim = self.document.sentences[a].text.similarity(&self.document.sentences[b].text);
            return self.compute(a, b, sim);
        };

        if let Some(value) = self.cache[slot] {
            self.hits += 1;
            return value;
        }

        self.misses += 1;
        let value = self.compute(a, b, self.similarities[slot]);
        self.cache[slot] = Some(value);
        value
    }

    /// Distribution over the receiver's state given the sender's state
    pub fn compatibility(&mut self, sender_state: State, from: usize, to: usize) -> Belief {
        match sender_state {
            State::NotReference => Belief::UNIFORM,
            State::Reference => Belief::from_reference_probability(sigmoid(self.relatedness(from, to))),
        }
    }

    /// (hits, misses) of the relatedness cache
    pub fn cache_stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// All windowed pairs had the same similarity
    pub fn similarity_range_degenerate(&self) -> bool {
        self.range.is_some_and(|r| r.is_degenerate())
    }
}
