//! Weighted room adjacency with Prim's minimum spanning tree.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::types::RoomId;

/// Marks an edge that has not been turned into a corridor yet.
pub const UNPROCESSED_EDGE_WEIGHT: f32 = 1.0;
/// Marks an edge whose corridor has been routed.
pub const PROCESSED_EDGE_WEIGHT: f32 = 2.0;

/// Directed adjacency keyed by room id. No self-loops, at most one edge per
/// ordered pair. Iteration order is the key order of the ids.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoomGraph {
    adjacency: BTreeMap<RoomId, BTreeMap<RoomId, f32>>,
}

impl RoomGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nodes(nodes: impl IntoIterator<Item = RoomId>) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node);
        }
        graph
    }

    pub fn add_node(&mut self, node: RoomId) {
        self.adjacency.entry(node).or_default();
    }

    /// Adds `from -> to` unless it already exists. Returns whether it was added.
    pub fn add_edge(&mut self, from: RoomId, to: RoomId, weight: f32) -> bool {
        if from == to || self.contains_edge(from, to) {
            return false;
        }
        self.add_node(to);
        self.adjacency.entry(from).or_default().insert(to, weight);
        true
    }

    pub fn add_undirected_edge(&mut self, a: RoomId, b: RoomId, weight: f32) {
        self.add_edge(a, b, weight);
        self.add_edge(b, a, weight);
    }

    pub fn contains_edge(&self, from: RoomId, to: RoomId) -> bool {
        self.adjacency.get(&from).is_some_and(|edges| edges.contains_key(&to))
    }

    pub fn weight(&self, from: RoomId, to: RoomId) -> Option<f32> {
        self.adjacency.get(&from).and_then(|edges| edges.get(&to)).copied()
    }

    /// Updates an existing edge. Returns false when the edge is absent.
    pub fn set_weight(&mut self, from: RoomId, to: RoomId, weight: f32) -> bool {
        match self.adjacency.get_mut(&from).and_then(|edges| edges.get_mut(&to)) {
            Some(slot) => {
                *slot = weight;
                true
            }
            None => false,
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn neighbors(&self, node: RoomId) -> impl Iterator<Item = (RoomId, f32)> + '_ {
        self.adjacency.get(&node).into_iter().flatten().map(|(&to, &weight)| (to, weight))
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of unordered connected pairs.
    pub fn edge_count(&self) -> usize {
        self.undirected_edges().len()
    }

    /// Each connected pair once, smaller id first, in key order.
    pub fn undirected_edges(&self) -> Vec<(RoomId, RoomId)> {
        let mut pairs = BTreeSet::new();
        for (&from, edges) in &self.adjacency {
            for &to in edges.keys() {
                pairs.insert(if from < to { (from, to) } else { (to, from) });
            }
        }
        pairs.into_iter().collect()
    }

    /// Breadth-first reachability over edges in either direction.
    pub fn is_connected(&self) -> bool {
        let Some(start) = self.nodes().next() else {
            return true;
        };
        let mut undirected: BTreeMap<RoomId, Vec<RoomId>> = BTreeMap::new();
        for (a, b) in self.undirected_edges() {
            undirected.entry(a).or_default().push(b);
            undirected.entry(b).or_default().push(a);
        }

        let mut visited = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for &next in undirected.get(&node).into_iter().flatten() {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        visited.len() == self.node_count()
    }

    /// Prim's algorithm from the smallest id. Tree edges land in a fresh graph
    /// in both directions with [`UNPROCESSED_EDGE_WEIGHT`]. A disconnected
    /// input yields a spanning forest.
    pub fn minimum_spanning_tree(&self) -> RoomGraph {
        let nodes: Vec<RoomId> = self.nodes().collect();
        let index_of: BTreeMap<RoomId, usize> =
            nodes.iter().enumerate().map(|(index, &id)| (id, index)).collect();

        let mut tree = RoomGraph::with_nodes(nodes.iter().copied());
        let mut in_tree = vec![false; nodes.len()];
        let mut best = vec![f32::INFINITY; nodes.len()];
        let mut parent: Vec<Option<usize>> = vec![None; nodes.len()];

        for _ in 0..nodes.len() {
            // Cheapest frontier node; an unreachable remainder restarts a new tree.
            let mut next = None;
            for index in 0..nodes.len() {
                if in_tree[index] {
                    continue;
                }
                match next {
                    None => next = Some(index),
                    Some(current) if best[index] < best[current] => next = Some(index),
                    Some(_) => {}
                }
            }
            let Some(current) = next else { break };

            in_tree[current] = true;
            if let Some(from) = parent[current] {
                tree.add_undirected_edge(nodes[from], nodes[current], UNPROCESSED_EDGE_WEIGHT);
            }

            for (neighbor, weight) in self.neighbors(nodes[current]) {
                let Some(&index) = index_of.get(&neighbor) else { continue };
                if !in_tree[index] && weight < best[index] {
                    best[index] = weight;
                    parent[index] = Some(current);
                }
            }
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(count: usize) -> Vec<RoomId> {
        let mut keys: SlotMap<RoomId, ()> = SlotMap::with_key();
        (0..count).map(|_| keys.insert(())).collect()
    }

    #[test]
    fn duplicate_edges_and_self_loops_are_rejected() {
        let ids = ids(2);
        let mut graph = RoomGraph::new();
        assert!(graph.add_edge(ids[0], ids[1], 3.0));
        assert!(!graph.add_edge(ids[0], ids[1], 5.0));
        assert!(!graph.add_edge(ids[0], ids[0], 1.0));
        assert_eq!(graph.weight(ids[0], ids[1]), Some(3.0));
        assert_eq!(graph.weight(ids[1], ids[0]), None);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn weights_can_be_marked_processed() {
        let ids = ids(2);
        let mut graph = RoomGraph::new();
        graph.add_undirected_edge(ids[0], ids[1], UNPROCESSED_EDGE_WEIGHT);
        assert!(graph.set_weight(ids[1], ids[0], PROCESSED_EDGE_WEIGHT));
        assert_eq!(graph.weight(ids[1], ids[0]), Some(PROCESSED_EDGE_WEIGHT));
        assert_eq!(graph.weight(ids[0], ids[1]), Some(UNPROCESSED_EDGE_WEIGHT));
        assert!(!graph.set_weight(ids[0], ids[0], PROCESSED_EDGE_WEIGHT));
    }

    #[test]
    fn spanning_tree_picks_cheapest_edges_and_resets_weights() {
        let ids = ids(4);
        let mut graph = RoomGraph::with_nodes(ids.iter().copied());
        graph.add_undirected_edge(ids[0], ids[1], 1.5);
        graph.add_undirected_edge(ids[1], ids[2], 2.0);
        graph.add_undirected_edge(ids[0], ids[2], 9.0);
        graph.add_undirected_edge(ids[2], ids[3], 4.0);
        graph.add_undirected_edge(ids[1], ids[3], 7.0);

        let tree = graph.minimum_spanning_tree();
        assert_eq!(tree.edge_count(), 3);
        assert!(tree.contains_edge(ids[0], ids[1]) && tree.contains_edge(ids[1], ids[0]));
        assert!(tree.contains_edge(ids[1], ids[2]));
        assert!(tree.contains_edge(ids[2], ids[3]));
        assert!(!tree.contains_edge(ids[0], ids[2]));
        for (a, b) in tree.undirected_edges() {
            assert_eq!(tree.weight(a, b), Some(UNPROCESSED_EDGE_WEIGHT));
        }
        assert!(tree.is_connected());
    }

    #[test]
    fn disconnected_input_yields_a_forest() {
        let ids = ids(4);
        let mut graph = RoomGraph::with_nodes(ids.iter().copied());
        graph.add_undirected_edge(ids[0], ids[1], 1.0);
        graph.add_undirected_edge(ids[2], ids[3], 1.0);
        let tree = graph.minimum_spanning_tree();
        assert_eq!(tree.edge_count(), 2);
        assert!(!tree.is_connected());
    }

    #[test]
    fn empty_and_single_node_graphs_are_connected() {
        assert!(RoomGraph::new().is_connected());
        let single = RoomGraph::with_nodes(ids(1));
        assert!(single.is_connected());
        assert_eq!(single.minimum_spanning_tree().edge_count(), 0);
    }
}
