//! Triangulation graph, spanning tree, back edges and connection bookkeeping.

use crate::rng::DungeonRng;
use crate::types::RoomId;

use super::graph::{RoomGraph, UNPROCESSED_EDGE_WEIGHT};
use super::model::RoomArena;
use super::triangulation::{Triangulation, TriangulationVertex, triangulate};

/// Everything the connectivity stage produced, kept for reporting and tests.
#[derive(Clone, Debug)]
pub struct Connectivity {
    pub triangulation: Triangulation,
    pub triangulation_graph: RoomGraph,
    pub spanning_edges: usize,
    pub back_edges: usize,
    pub graph: RoomGraph,
}

pub fn main_room_vertices(rooms: &RoomArena, main_rooms: &[RoomId]) -> Vec<TriangulationVertex> {
    main_rooms
        .iter()
        .filter_map(|&id| rooms.get(id))
        .map(|room| TriangulationVertex { room: room.id, position: room.center })
        .collect()
}

/// Both directions of every triangulation edge, weighted by center distance.
pub fn triangulation_graph(triangulation: &Triangulation, nodes: &[RoomId]) -> RoomGraph {
    let mut graph = RoomGraph::with_nodes(nodes.iter().copied());
    for (a, b) in triangulation.edges() {
        let distance = a.position.distance(b.position);
        if !graph.contains_edge(a.room, b.room) {
            graph.add_undirected_edge(a.room, b.room, distance);
        }
    }
    graph
}

/// Re-adds `round(candidates * ratio)` shuffled triangulation edges that the
/// tree dropped. Returns how many were added.
pub fn add_back_edges(
    tree: &mut RoomGraph,
    triangulation_graph: &RoomGraph,
    ratio: f32,
    rng: &mut DungeonRng,
) -> usize {
    let mut candidates: Vec<(RoomId, RoomId)> = triangulation_graph
        .undirected_edges()
        .into_iter()
        .filter(|&(a, b)| !tree.contains_edge(a, b))
        .collect();
    let wanted = ((candidates.len() as f32 * ratio).round() as usize).min(candidates.len());

    rng.shuffle(&mut candidates);
    for &(a, b) in &candidates[..wanted] {
        tree.add_undirected_edge(a, b, UNPROCESSED_EDGE_WEIGHT);
    }
    wanted
}

/// Writes every node's neighbors into its room's `connected_ids`.
pub fn record_connections(graph: &RoomGraph, rooms: &mut RoomArena) {
    for node in graph.nodes() {
        let neighbors: Vec<RoomId> = graph.neighbors(node).map(|(id, _)| id).collect();
        if let Some(room) = rooms.get_mut(node) {
            room.connected_ids.extend(neighbors);
        }
    }
}

pub fn connect_main_rooms(
    rooms: &mut RoomArena,
    main_rooms: &[RoomId],
    edge_add_back_ratio: f32,
    rng: &mut DungeonRng,
) -> Connectivity {
    let triangulation = triangulate(&main_room_vertices(rooms, main_rooms));
    let triangulation_graph = triangulation_graph(&triangulation, main_rooms);
    let mut graph = triangulation_graph.minimum_spanning_tree();
    let spanning_edges = graph.edge_count();
    let back_edges = add_back_edges(&mut graph, &triangulation_graph, edge_add_back_ratio, rng);
    record_connections(&graph, rooms);

    log::debug!(
        "connectivity: {} triangles, {} tree edges, {} back edges",
        triangulation.triangles.len(),
        spanning_edges,
        back_edges
    );

    Connectivity { triangulation, triangulation_graph, spanning_edges, back_edges, graph }
}
