//! Loopy belief propagation
//!
//! Message passing over the window graph of one document: every sentence
//! is linked to the sentences within `neighbourhood` positions on either
//! side, and messages flow along both directions of every link.

mod engine;
mod graph;

pub use engine::{BeliefPropagation, InferenceOutcome, PropagationConfig};
pub use graph::{Edge, WindowGraph};
