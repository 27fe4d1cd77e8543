//! Two-state probability vectors
//!
//! Every belief and message in the model is a distribution over
//! {NOT_REFERENCE, REFERENCE}. Normalization is a pure function: callers
//! always use the returned vector.

use crate::errors::MrfError;
use citectx_common::metrics::record_degenerate_normalization;
use serde::{Deserialize, Serialize};
use std::ops::Index;
use tracing::{debug, warn};

/// Hidden state of a sentence node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    NotReference,
    Reference,
}

impl State {
    /// Both states, in vector order
    pub const ALL: [State; 2] = [State::NotReference, State::Reference];

    pub fn index(self) -> usize {
        match self {
            State::NotReference => 0,
            State::Reference => 1,
        }
    }
}

/// Probability vector `(p_not_ref, p_ref)` summing to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Belief([f64; 2]);

impl Belief {
    /// Non-informative distribution, also the initial value of every message
    pub const UNIFORM: Belief = Belief([0.5, 0.5]);

    /// Prior of an explicit reference
    pub const CERTAIN_REFERENCE: Belief = Belief([0.0, 1.0]);

    /// Belief from a REFERENCE probability in [0, 1]
    pub fn from_reference_probability(p: f64) -> Self {
        Belief([1.0 - p, p])
    }

    /// Scale a non-negative vector to sum to 1. A zero (or non-finite) sum
    /// falls back to the uniform distribution.
    pub fn normalized(raw: [f64; 2]) -> Self {
        let sum = raw[0] + raw[1];
        if sum == 0.0 {
            debug!("Zero-sum probability vector, falling back to uniform");
            record_degenerate_normalization("zero_sum");
            return Self::UNIFORM;
        }
        if !sum.is_finite() || raw.iter().any(|p| !p.is_finite()) {
            warn!(p0 = raw[0], p1 = raw[1], "Non-finite probability vector, falling back to uniform");
            record_degenerate_normalization("non_finite");
            return Self::UNIFORM;
        }
        Belief([raw[0] / sum, raw[1] / sum])
    }

    /// Parse and normalize an external vector
    pub fn try_from_slice(values: &[f64]) -> Result<Self, MrfError> {
        match values {
            [p0, p1] => Ok(Self::normalized([*p0, *p1])),
            _ => Err(MrfError::InvalidProbabilityVector { len: values.len() }),
        }
    }

    pub fn not_reference(&self) -> f64 {
        self.0[0]
    }

    pub fn reference(&self) -> f64 {
        self.0[1]
    }

    /// Elementwise product with an unnormalized accumulator
    pub fn times(&self, other: [f64; 2]) -> [f64; 2] {
        [self.0[0] * other[0], self.0[1] * other[1]]
    }

    /// Largest per-component absolute difference
    pub fn max_abs_diff(&self, other: &Belief) -> f64 {
        (self.0[0] - other.0[0]).abs().max((self.0[1] - other.0[1]).abs())
    }
}

impl Default for Belief {
    fn default() -> Self {
        Self::UNIFORM
    }
}

impl Index<State> for Belief {
    type Output = f64;

    fn index(&self, state: State) -> &f64 {
        &self.0[state.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics::{
        Counter, CounterFn, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    struct Tally(AtomicU64);

    impl CounterFn for Tally {
        fn increment(&self, value: u64) {
            self.0.fetch_add(value, Ordering::Relaxed);
        }

        fn absolute(&self, value: u64) {
            self.0.store(value, Ordering::Relaxed);
        }
    }

    /// Keeps every counter handed out so tests can read them back
    #[derive(Default)]
    struct CountingRecorder {
        counters: Mutex<Vec<(Key, Arc<Tally>)>>,
    }

    impl CountingRecorder {
        fn total(&self, name: &str, kind: &str) -> u64 {
            self.counters
                .lock()
                .unwrap()
                .iter()
                .filter(|(key, _)| {
                    key.name() == name
                        && key.labels().any(|l| l.key() == "kind" && l.value() == kind)
                })
                .map(|(_, tally)| tally.0.load(Ordering::Relaxed))
                .sum()
        }
    }

    impl Recorder for CountingRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            let tally = Arc::new(Tally(AtomicU64::new(0)));
            self.counters.lock().unwrap().push((key.clone(), Arc::clone(&tally)));
            Counter::from_arc(tally)
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    #[test]
    fn test_normalization_sums_to_one() {
        let b = Belief::normalized([0.2, 0.6]);
        assert!((b.not_reference() - 0.25).abs() < 1e-12);
        assert!((b.reference() - 0.75).abs() < 1e-12);
        assert!((b.not_reference() + b.reference() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_sum_falls_back_to_uniform() {
        assert_eq!(Belief::normalized([0.0, 0.0]), Belief::UNIFORM);
    }

    #[test]
    fn test_fallbacks_are_counted() {
        let recorder = CountingRecorder::default();
        metrics::with_local_recorder(&recorder, || {
            Belief::normalized([0.0, 0.0]);
            Belief::normalized([0.0, 0.0]);
            Belief::normalized([f64::NAN, 0.5]);
            Belief::normalized([0.2, 0.3]);
        });

        let name = "citectx_degenerate_normalizations_total";
        assert_eq!(recorder.total(name, "zero_sum"), 2);
        assert_eq!(recorder.total(name, "non_finite"), 1);
    }

    #[test]
    fn test_non_finite_falls_back_to_uniform() {
        assert_eq!(Belief::normalized([f64::INFINITY, 1.0]), Belief::UNIFORM);
        assert_eq!(Belief::normalized([f64::NAN, 1.0]), Belief::UNIFORM);
    }

    #[test]
    fn test_slice_length_checked() {
        assert!(Belief::try_from_slice(&[1.0, 3.0]).is_ok());
        let err = Belief::try_from_slice(&[0.3, 0.3, 0.4]).unwrap_err();
        assert!(matches!(err, MrfError::InvalidProbabilityVector { len: 3 }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_state_indexing() {
        let b = Belief::from_reference_probability(0.8);
        assert!((b[State::Reference] - 0.8).abs() < 1e-12);
        assert!((b[State::NotReference] - 0.2).abs() < 1e-12);
        assert_eq!(State::ALL[1], State::Reference);
    }
}
