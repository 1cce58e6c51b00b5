//! The attributed, mixed (directed/undirected) multigraph with integer
//! timestamps that Subdue discovers patterns in.
//!
//! Vertices and edges are stored in two insertion-ordered tables, keyed by
//! opaque string ids. Adjacency and edge endpoints are expressed purely as
//! ids; there are no internal object references, so the graph can freely
//! delete and reseat vertices/edges during compression (see `compress`)
//! without invalidating anything held elsewhere -- instances only ever hold
//! ids too (see `crate::pattern::Instance`).

pub mod io;

use crate::error::GraphError;
use crate::pattern::Instance;
use indexmap::IndexMap;
use std::hash::BuildHasherDefault;
use std::rc::Rc;

pub type VertexId = Rc<str>;
pub type EdgeId = Rc<str>;
pub type AttributeMap = IndexMap<String, String, BuildHasherDefault<ahash::AHasher>>;

fn attribute_map() -> AttributeMap {
    AttributeMap::default()
}

#[derive(Debug, Clone)]
pub struct Vertex {
    pub id: VertexId,
    pub attributes: AttributeMap,
    pub timestamp: i64,
    pub temporal_rank: usize,
    /// Ids of edges incident on this vertex, in insertion order.
    pub adjacency: Vec<EdgeId>,
}

impl Vertex {
    pub fn new(id: VertexId) -> Self {
        Self {
            id,
            attributes: attribute_map(),
            timestamp: 0,
            temporal_rank: 0,
            adjacency: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    pub source: VertexId,
    pub target: VertexId,
    pub directed: bool,
    pub attributes: AttributeMap,
    pub timestamp: i64,
    pub temporal_rank: usize,
}

impl Edge {
    pub fn new(id: EdgeId, source: VertexId, target: VertexId, directed: bool) -> Self {
        Self {
            id,
            source,
            target,
            directed,
            attributes: attribute_map(),
            timestamp: 0,
            temporal_rank: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    vertices: IndexMap<VertexId, Vertex, BuildHasherDefault<ahash::AHasher>>,
    edges: IndexMap<EdgeId, Edge, BuildHasherDefault<ahash::AHasher>>,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            vertices: IndexMap::default(),
            edges: IndexMap::default(),
        }
    }

    pub fn add_vertex(&mut self, vertex: Vertex) -> Result<(), GraphError> {
        if self.vertices.contains_key(&vertex.id) {
            return Err(GraphError::DuplicateVertex(vertex.id.to_string()));
        }
        self.vertices.insert(vertex.id.clone(), vertex);
        Ok(())
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if self.edges.contains_key(&edge.id) {
            return Err(GraphError::DuplicateEdge(edge.id.to_string()));
        }
        if !self.vertices.contains_key(&edge.source) {
            return Err(GraphError::UnknownEndpoint {
                edge: edge.id.to_string(),
                vertex: edge.source.to_string(),
            });
        }
        if !self.vertices.contains_key(&edge.target) {
            return Err(GraphError::UnknownEndpoint {
                edge: edge.id.to_string(),
                vertex: edge.target.to_string(),
            });
        }

        // A self-loop pushes its id onto the vertex's adjacency twice, matching
        // the degree convention of the source's `load_from_json` (which calls
        // `add_edge` once per endpoint, so a self-loop's single edge is added
        // under both endpoints even though they're the same vertex).
        self.vertices
            .get_mut(&edge.source)
            .unwrap()
            .adjacency
            .push(edge.id.clone());
        self.vertices
            .get_mut(&edge.target)
            .unwrap()
            .adjacency
            .push(edge.id.clone());
        self.edges.insert(edge.id.clone(), edge);
        Ok(())
    }

    pub fn vertex(&self, id: &str) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Assigns `temporal_rank` to every vertex and edge, based on the index
    /// of its timestamp in the sorted sequence of distinct timestamps
    /// appearing anywhere in the graph. Idempotent.
    pub fn temporal_order(&mut self) {
        let mut timestamps: Vec<i64> = self
            .vertices
            .values()
            .map(|v| v.timestamp)
            .chain(self.edges.values().map(|e| e.timestamp))
            .collect();
        timestamps.sort_unstable();
        timestamps.dedup();

        for vertex in self.vertices.values_mut() {
            vertex.temporal_rank = timestamps.partition_point(|t| *t < vertex.timestamp);
        }
        for edge in self.edges.values_mut() {
            edge.temporal_rank = timestamps.partition_point(|t| *t < edge.timestamp);
        }
    }

    /// Replaces each of `instances` with a single summary vertex, reseating
    /// edges that connect the instance to the rest of the graph. Assumes
    /// the instances are pairwise vertex-disjoint -- the caller is
    /// responsible for filtering overlapping instances before calling this
    /// (see `crate::discovery::run`); behavior is unspecified otherwise.
    pub fn compress(&mut self, iteration: usize, instances: &[Instance]) {
        for (n, instance) in instances.iter().enumerate() {
            let instance_num = n + 1;
            let new_id: VertexId = Rc::from(format!("PATTERN-{iteration}-{instance_num}").as_str());
            let mut new_vertex = Vertex::new(new_id.clone());
            new_vertex.timestamp = instance.max_timestamp(self);
            new_vertex
                .attributes
                .insert("label".to_string(), format!("PATTERN-{iteration}"));

            for edge_id in instance.edges.iter() {
                if let Some(edge) = self.edges.shift_remove(edge_id) {
                    remove_adjacency(&mut self.vertices, &edge.source, edge_id);
                    remove_adjacency(&mut self.vertices, &edge.target, edge_id);
                }
            }

            let mut new_adjacency: Vec<EdgeId> = Vec::new();
            for vertex_id in instance.vertices.iter() {
                let Some(vertex) = self.vertices.get(vertex_id) else {
                    continue;
                };
                let remaining: Vec<EdgeId> = vertex.adjacency.clone();
                for edge_id in remaining {
                    if let Some(edge) = self.edges.get_mut(&edge_id) {
                        if edge.source == *vertex_id {
                            edge.source = new_id.clone();
                        }
                        if edge.target == *vertex_id {
                            edge.target = new_id.clone();
                        }
                        if !new_adjacency.contains(&edge_id) {
                            new_adjacency.push(edge_id);
                        }
                    }
                }
            }
            new_vertex.adjacency = new_adjacency;

            for vertex_id in instance.vertices.iter() {
                self.vertices.shift_remove(vertex_id);
            }

            self.vertices.insert(new_id, new_vertex);
        }
    }
}

fn remove_adjacency(
    vertices: &mut IndexMap<VertexId, Vertex, BuildHasherDefault<ahash::AHasher>>,
    vertex_id: &VertexId,
    edge_id: &EdgeId,
) {
    if let Some(vertex) = vertices.get_mut(vertex_id) {
        vertex.adjacency.retain(|e| e != edge_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Instance;

    fn path_graph_with_timestamps(timestamps: &[i64]) -> Graph {
        let mut g = Graph::new();
        for (i, ts) in timestamps.iter().enumerate() {
            let mut v = Vertex::new(Rc::from((i + 1).to_string().as_str()));
            v.timestamp = *ts;
            g.add_vertex(v).unwrap();
        }
        for i in 1..timestamps.len() {
            g.add_edge(Edge::new(
                Rc::from(format!("e{i}").as_str()),
                Rc::from(i.to_string().as_str()),
                Rc::from((i + 1).to_string().as_str()),
                false,
            ))
            .unwrap();
        }
        g
    }

    #[test]
    fn temporal_order_assigns_ranks_by_distinct_sorted_timestamp() {
        let mut g = path_graph_with_timestamps(&[30, 10, 20]);
        g.temporal_order();
        assert_eq!(g.vertex("1").unwrap().temporal_rank, 2);
        assert_eq!(g.vertex("2").unwrap().temporal_rank, 0);
        assert_eq!(g.vertex("3").unwrap().temporal_rank, 1);
    }

    #[test]
    fn temporal_order_is_idempotent() {
        let mut g = path_graph_with_timestamps(&[5, 5, 9]);
        g.temporal_order();
        let before: Vec<usize> = g.vertices().map(|v| v.temporal_rank).collect();
        g.temporal_order();
        let after: Vec<usize> = g.vertices().map(|v| v.temporal_rank).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn compress_replaces_instance_and_reseats_external_edges() {
        // 1 - 2 - 3, compress the instance {1,2}/{e1}; e2 must reseat onto
        // the new summary vertex.
        let mut g = path_graph_with_timestamps(&[10, 20, 30]);
        let instance = Instance::from_edge(&g, "e1");
        g.compress(1, std::slice::from_ref(&instance));

        assert_eq!(g.num_vertices(), 2);
        assert!(g.vertex("1").is_none());
        assert!(g.vertex("2").is_none());
        assert!(g.edge("e1").is_none());

        let summary = g.vertex("PATTERN-1-1").expect("summary vertex must exist");
        assert_eq!(summary.timestamp, 20);
        assert_eq!(summary.attributes.get("label").map(String::as_str), Some("PATTERN-1"));

        let e2 = g.edge("e2").expect("external edge must survive compression");
        assert!(e2.source == summary.id || e2.target == summary.id);
        assert!(summary.adjacency.contains(&Rc::from("e2")));
    }
}
