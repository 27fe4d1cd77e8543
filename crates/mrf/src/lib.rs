//! CiteCtx MRF classifier
//!
//! Classifies the sentences of a citing paper as explicit, implicit or
//! non-references to a cited work using a pairwise Markov Random Field:
//! - Self-belief priors from lexical cues and similarity to the cited work
//! - Relatedness-weighted compatibility between nearby sentences
//! - Synchronous loopy belief propagation over a windowed sentence graph
//! - Context-gated decisions and confusion-matrix scoring
//!
//! Documents are independent, so a dataset can be classified concurrently
//! with [`MrfClassifier::classify_dataset_concurrent`].

pub mod belief;
pub mod classifier;
pub mod errors;
pub mod propagation;
pub mod relatedness;
pub mod scaling;
pub mod scoring;
pub mod self_belief;

pub use belief::{Belief, State};
pub use classifier::MrfClassifier;
pub use errors::MrfError;
pub use propagation::{BeliefPropagation, InferenceOutcome, PropagationConfig, WindowGraph};
pub use relatedness::RelatednessModel;
pub use scoring::{ClassificationResult, CorpusResult, DocumentClassification, DocumentFailure};
pub use self_belief::{PriorEstimate, SelfBeliefEstimator};
