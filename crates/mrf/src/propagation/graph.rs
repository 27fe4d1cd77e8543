//! Windowed sentence graph
//!
//! Nodes are sentence positions; i and j are connected iff
//! 0 < |i - j| <= neighbourhood. Both directions of every connection are
//! stored as separate directed edges since messages are directional.

/// Directed edge carrying the message `from -> to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
}

/// Bounded-window chain graph over one document
#[derive(Debug, Clone)]
pub struct WindowGraph {
    node_count: usize,
    neighbourhood: usize,

    /// Sorted by (from, to); the position is the edge id
    edges: Vec<Edge>,

    /// node -> ids of edges pointing at it
    incoming: Vec<Vec<usize>>,

    /// edge id -> id of the opposite edge
    reverse: Vec<usize>,
}

impl WindowGraph {
    pub fn new(node_count: usize, neighbourhood: usize) -> Self {
        let mut edges = Vec::new();
        for from in 0..node_count {
            for to in window(from, node_count, neighbourhood) {
                edges.push(Edge { from, to });
            }
        }

        let mut incoming = vec![Vec::new(); node_count];
        for (id, edge) in edges.iter().enumerate() {
            incoming[edge.to].push(id);
        }

        // Edges are sorted and symmetric, so the opposite edge sits at its
        // partition point
        let reverse = edges
            .iter()
            .map(|e| {
                let opposite = Edge { from: e.to, to: e.from };
                edges.partition_point(|x| *x < opposite)
            })
            .collect();

        Self {
            node_count,
            neighbourhood,
            edges,
            incoming,
            reverse,
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn neighbourhood(&self) -> usize {
        self.neighbourhood
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Ids of the edges delivering messages to `node`
    pub fn incoming(&self, node: usize) -> &[usize] {
        &self.incoming[node]
    }

    /// Id of the edge running the other way
    pub fn reverse(&self, edge_id: usize) -> usize {
        self.reverse[edge_id]
    }
}

/// Positions within `radius` of `node`, excluding the node itself
fn window(node: usize, node_count: usize, radius: usize) -> impl Iterator<Item = usize> {
    let left = node.saturating_sub(radius);
    let right = node.saturating_add(radius).min(node_count.saturating_sub(1));
    (left..=right).filter(move |&m| m != node && node_count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_edges() {
        let graph = WindowGraph::new(5, 2);
        // Node 0: 1,2; node 1: 0,2,3; node 2: 0,1,3,4; node 3: 1,2,4; node 4: 2,3
        assert_eq!(graph.edge_count(), 14);
        let senders: Vec<usize> = graph.incoming(2).iter().map(|&id| graph.edges()[id].from).collect();
        assert_eq!(senders, vec![0, 1, 3, 4]);
        assert_eq!(graph.incoming(0).len(), 2);
    }

    #[test]
    fn test_reverse_edges() {
        let graph = WindowGraph::new(4, 4);
        for (id, edge) in graph.edges().iter().enumerate() {
            let rev = graph.edges()[graph.reverse(id)];
            assert_eq!(rev, Edge { from: edge.to, to: edge.from });
        }
    }

    #[test]
    fn test_zero_radius_has_no_edges() {
        let graph = WindowGraph::new(6, 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.incoming(3).is_empty());
    }

    #[test]
    fn test_unbounded_radius_is_complete_graph() {
        let graph = WindowGraph::new(4, usize::MAX);
        assert_eq!(graph.edge_count(), 12);
        assert_eq!(graph.neighbourhood(), usize::MAX);
    }

    #[test]
    fn test_single_and_empty_documents() {
        assert_eq!(WindowGraph::new(1, 4).edge_count(), 0);
        assert_eq!(WindowGraph::new(0, 4).edge_count(), 0);
    }
}
