//! Synchronous loopy belief propagation
//!
//! Every sweep computes all outgoing messages from the previous sweep's
//! messages only and writes them into a second buffer, which then becomes
//! the current one. The engine stops after the first sweep in which no
//! message moved by more than `delta`, or when the sweep budget is spent.

use super::WindowGraph;
use crate::belief::{Belief, State};
use crate::relatedness::RelatednessModel;
use citectx_common::TextFeatures;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct PropagationConfig {
    /// Sweep budget
    pub max_iterations: usize,

    /// Per-component change threshold
    pub delta: f64,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            delta: 0.02,
        }
    }
}

/// Result of running inference on one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceOutcome {
    /// Priors the run started from
    pub self_beliefs: Vec<Belief>,

    /// Marginals after the last sweep
    pub beliefs: Vec<Belief>,

    /// Sweeps executed (never more than the budget)
    pub sweeps: usize,

    /// A sweep finished without any message changing
    pub converged: bool,
}

/// Double-buffered message store, indexed by edge id
struct Messages {
    current: Vec<Belief>,
    next: Vec<Belief>,
}

impl Messages {
    fn uniform(edge_count: usize) -> Self {
        Self {
            current: vec![Belief::UNIFORM; edge_count],
            next: vec![Belief::UNIFORM; edge_count],
        }
    }

    fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }
}

/// Belief propagation over a window graph
pub struct BeliefPropagation<'g> {
    graph: &'g WindowGraph,
    config: PropagationConfig,
}

impl<'g> BeliefPropagation<'g> {
    pub fn new(graph: &'g WindowGraph, config: PropagationConfig) -> Self {
        Self { graph, config }
    }

    /// Run to convergence or budget exhaustion
    pub fn run<T: TextFeatures>(
        &self,
        priors: &[Belief],
        relatedness: &mut RelatednessModel<'_, T>,
    ) -> InferenceOutcome {
        debug_assert_eq!(priors.len(), self.graph.node_count());

        let mut messages = Messages::uniform(self.graph.edge_count());
        let mut sweeps = 0;
        let mut converged = self.graph.edge_count() == 0;

        while !converged && sweeps < self.config.max_iterations {
            let changed = self.sweep(priors, &mut messages, relatedness);
            sweeps += 1;
            converged = !changed;
        }

        debug!(
            nodes = self.graph.node_count(),
            neighbourhood = self.graph.neighbourhood(),
            edges = self.graph.edge_count(),
            sweeps,
            converged,
            "Belief propagation finished"
        );

        InferenceOutcome {
            self_beliefs: priors.to_vec(),
            beliefs: self.final_beliefs(priors, &messages.current),
            sweeps,
            converged,
        }
    }

    /// One synchronous sweep over every directed edge. Returns whether any
    /// message changed by more than `delta`.
    fn sweep<T: TextFeatures>(
        &self,
        priors: &[Belief],
        messages: &mut Messages,
        relatedness: &mut RelatednessModel<'_, T>,
    ) -> bool {
        let mut changed = 0usize;
        let mut max_diff: f64 = 0.0;

        for (id, edge) in self.graph.edges().iter().enumerate() {
            // Sender's belief about itself, ignoring what the receiver told it
            let except = self.graph.reverse(id);
            let product = self.product_of_incoming(edge.from, Some(except), &messages.current);
            let sender = Belief::normalized(priors[edge.from].times(product));

            let message = self.outgoing_message(&sender, edge.from, edge.to, relatedness);

            let diff = message.max_abs_diff(&messages.current[id]);
            if diff > self.config.delta {
                changed += 1;
            }
            max_diff = max_diff.max(diff);

            messages.next[id] = message;
        }

        messages.swap();
        debug!(changed, max_diff, "Sweep complete");
        changed > 0
    }

    /// Marginalize the sender's state through the compatibility potential
    fn outgoing_message<T: TextFeatures>(
        &self,
        sender: &Belief,
        from: usize,
        to: usize,
        relatedness: &mut RelatednessModel<'_, T>,
    ) -> Belief {
        let mut raw = [0.0; 2];
        for state in State::ALL {
            let compatibility = relatedness.compatibility(state, from, to);
            for receiver in State::ALL {
                raw[receiver.index()] += sender[state] * compatibility[receiver];
            }
        }
        Belief::normalized(raw)
    }

    /// Elementwise product of the messages `node` received, optionally
    /// leaving one edge out
    fn product_of_incoming(&self, node: usize, except: Option<usize>, messages: &[Belief]) -> [f64; 2] {
        self.graph
            .incoming(node)
            .iter()
            .filter(|&&id| Some(id) != except)
            .fold([1.0, 1.0], |acc, &id| messages[id].times(acc))
    }

    /// Prior times every stored incoming message, renormalized. Nodes
    /// without neighbours keep their prior untouched.
    pub fn final_beliefs(&self, priors: &[Belief], messages: &[Belief]) -> Vec<Belief> {
        (0..self.graph.node_count())
            .map(|node| {
                if self.graph.incoming(node).is_empty() {
                    return priors[node];
                }
                let product = self.product_of_incoming(node, None, messages);
                Belief::normalized(priors[node].times(product))
            })
            .collect()
    }
}
