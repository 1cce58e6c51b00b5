//! Pattern and instance algebra: the middle layer between the graph model
//! and the discovery engine's beam search.

use crate::graph::{Edge, EdgeId, Graph, Vertex, VertexId};
use crate::matcher;
use crate::ordered_set::OrderedSet;
use itertools::Itertools;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// Which pairs of instances are allowed to coexist inside one pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Instances may not share a vertex.
    None,
    /// Instances may share vertices but not edges.
    Vertex,
    /// Instances may share vertices and edges, as long as they are distinct.
    Edge,
}

impl Default for OverlapPolicy {
    fn default() -> Self {
        OverlapPolicy::None
    }
}

/// A connected subgraph of an enclosing `Graph`, represented purely as ids
/// into that graph's vertex/edge tables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Instance {
    pub vertices: OrderedSet<VertexId>,
    pub edges: OrderedSet<EdgeId>,
}

impl Instance {
    pub fn new() -> Self {
        Self::default()
    }

    /// The one-edge instance `{edge.source, edge.target}` / `{edge}`.
    pub fn from_edge(graph: &Graph, edge_id: &str) -> Instance {
        let edge = graph
            .edge(edge_id)
            .expect("from_edge called with an edge id not present in this graph");
        let mut instance = Instance::new();
        instance.edges.insert(edge.id.clone());
        instance.vertices.insert(edge.source.clone());
        instance.vertices.insert(edge.target.clone());
        instance
    }

    /// All instances obtainable by adding exactly one edge incident on an
    /// existing vertex and not already part of this instance.
    pub fn extend(&self, graph: &Graph) -> Vec<Instance> {
        let mut candidate_edges: OrderedSet<EdgeId> = OrderedSet::new();
        for vertex_id in self.vertices.iter() {
            if let Some(vertex) = graph.vertex(vertex_id) {
                for edge_id in &vertex.adjacency {
                    candidate_edges.insert(edge_id.clone());
                }
            }
        }

        candidate_edges
            .difference(&self.edges)
            .map(|edge_id| {
                let edge = graph.edge(edge_id).expect("candidate edge must exist");
                let mut extended = self.clone();
                extended.edges.insert(edge.id.clone());
                extended.vertices.insert(edge.source.clone());
                extended.vertices.insert(edge.target.clone());
                extended
            })
            .collect()
    }

    /// A fresh definition graph isomorphic to this instance, with synthetic
    /// ids `"1"..="n"` / `"1"..="m"` in this instance's insertion order.
    pub fn definition_graph(&self, graph: &Graph) -> Graph {
        let mut definition = Graph::new();
        let mut vertex_ids: HashMap<VertexId, VertexId> = HashMap::new();

        for (vertex_id, n) in self.vertices.iter().zip_eq(1..=self.vertices.len()) {
            let source = graph
                .vertex(vertex_id)
                .expect("instance vertex must exist in the enclosing graph");
            let new_id: VertexId = Rc::from(n.to_string().as_str());
            let mut v = Vertex::new(new_id.clone());
            v.timestamp = source.timestamp;
            v.attributes = source.attributes.clone();
            definition.add_vertex(v).expect("fresh id cannot collide");
            vertex_ids.insert(vertex_id.clone(), new_id);
        }

        for (edge_id, n) in self.edges.iter().zip_eq(1..=self.edges.len()) {
            let source = graph
                .edge(edge_id)
                .expect("instance edge must exist in the enclosing graph");
            let new_id: EdgeId = Rc::from(n.to_string().as_str());
            let new_source = vertex_ids[&source.source].clone();
            let new_target = vertex_ids[&source.target].clone();
            let mut e = Edge::new(new_id, new_source, new_target, source.directed);
            e.timestamp = source.timestamp;
            e.attributes = source.attributes.clone();
            definition.add_edge(e).expect("fresh id cannot collide");
        }

        definition
    }

    /// The maximum timestamp over all of this instance's vertices and
    /// edges, as looked up in `graph`.
    pub fn max_timestamp(&self, graph: &Graph) -> i64 {
        let vertex_max = self
            .vertices
            .iter()
            .map(|id| graph.vertex(id).expect("instance vertex must exist").timestamp)
            .max()
            .unwrap_or(0);
        let edge_max = self
            .edges
            .iter()
            .map(|id| graph.edge(id).expect("instance edge must exist").timestamp)
            .max()
            .unwrap_or(0);
        vertex_max.max(edge_max)
    }

    /// Vertex records of this instance, in insertion order.
    pub fn vertex_records<'g>(&self, graph: &'g Graph) -> Vec<&'g Vertex> {
        self.vertices
            .iter()
            .map(|id| graph.vertex(id).expect("instance vertex must exist"))
            .collect()
    }

    /// Edge records of this instance, in insertion order.
    pub fn edge_records<'g>(&self, graph: &'g Graph) -> Vec<&'g Edge> {
        self.edges
            .iter()
            .map(|id| graph.edge(id).expect("instance edge must exist"))
            .collect()
    }
}

fn instance_overlap(policy: OverlapPolicy, a: &Instance, b: &Instance) -> bool {
    match policy {
        OverlapPolicy::Edge => a == b,
        OverlapPolicy::Vertex => a.edges.intersects(&b.edges),
        OverlapPolicy::None => a.vertices.intersects(&b.vertices),
    }
}

/// `true` if `candidate` overlaps (per `policy`) any instance already in
/// `accepted`.
pub fn instances_overlap(policy: OverlapPolicy, accepted: &[Instance], candidate: &Instance) -> bool {
    accepted.iter().any(|existing| instance_overlap(policy, existing, candidate))
}

/// A definition graph together with its instances in the enclosing graph
/// and a compression-value score.
#[derive(Clone, Debug)]
pub struct Pattern {
    pub definition: Graph,
    pub instances: Vec<Instance>,
    pub value: f64,
}

impl Pattern {
    /// Sets `value` to the fraction of `graph`'s edges that replacing every
    /// instance with a summary vertex would eliminate.
    pub fn evaluate(&mut self, graph: &Graph) {
        let instances_saved = self.instances.len().saturating_sub(1) as f64;
        let definition_size = self.definition.num_edges() as f64;
        self.value = (instances_saved * definition_size) / graph.num_edges() as f64;
    }

    /// Extends every instance of this pattern by one edge in all possible
    /// ways, then regroups the resulting instances into new patterns by
    /// isomorphism of their definition graphs.
    pub fn extend(&self, graph: &Graph, overlap: OverlapPolicy, temporal: bool) -> Vec<Pattern> {
        let mut extended_instances: Vec<Instance> = Vec::new();
        for instance in &self.instances {
            for candidate in instance.extend(graph) {
                if !extended_instances.contains(&candidate) {
                    extended_instances.push(candidate);
                }
            }
        }
        group_instances(graph, extended_instances, overlap, temporal, false)
    }
}

/// Groups `instances` into patterns by isomorphism of their definition
/// graphs, honoring `overlap` within each group. When `require_multiple` is
/// set, singleton groups are dropped (used for initial one-edge patterns,
/// which Subdue only reports once they recur).
pub fn group_instances(
    graph: &Graph,
    instances: Vec<Instance>,
    overlap: OverlapPolicy,
    temporal: bool,
    require_multiple: bool,
) -> Vec<Pattern> {
    let mut remaining: VecDeque<(Instance, Graph)> = instances
        .into_iter()
        .map(|instance| {
            let mut definition = instance.definition_graph(graph);
            if temporal {
                definition.temporal_order();
            }
            (instance, definition)
        })
        .collect();

    let mut patterns = Vec::new();
    while let Some((seed_instance, seed_definition)) = remaining.pop_front() {
        let mut matching_instances = vec![seed_instance];
        let mut leftover = VecDeque::new();

        for (candidate_instance, candidate_definition) in remaining {
            if matcher::is_isomorphic(&seed_definition, &candidate_definition)
                && !instances_overlap(overlap, &matching_instances, &candidate_instance)
            {
                matching_instances.push(candidate_instance);
            } else {
                leftover.push_back((candidate_instance, candidate_definition));
            }
        }
        remaining = leftover;

        if require_multiple && matching_instances.len() <= 1 {
            continue;
        }
        patterns.push(Pattern {
            definition: seed_definition,
            instances: matching_instances,
            value: 0.0,
        });
    }
    patterns
}

/// Greedily selects a vertex-disjoint subset of `instances`, in order.
/// `Graph::compress` requires disjoint instances regardless of the overlap
/// policy a pattern was discovered under (`Vertex`/`Edge` overlap may still
/// share vertices, which compression can't reseat consistently), so this is
/// applied to the best pattern's instances before every compression call.
pub fn select_disjoint_instances(instances: &[Instance]) -> Vec<Instance> {
    let mut selected: Vec<Instance> = Vec::new();
    for instance in instances {
        if !instances_overlap(OverlapPolicy::None, &selected, instance) {
            selected.push(instance.clone());
        }
    }
    selected
}

/// Inserts `new_pattern` into `list`, which is kept sorted in non-increasing
/// order of value. If `list` already holds a pattern isomorphic to
/// `new_pattern`, the higher-valued one wins (ties favor the incumbent).
/// `list` is then trimmed to `capacity`: a count of patterns if
/// `value_based` is false, or a count of distinct values if true.
pub fn insert_pattern(list: &mut Vec<Pattern>, new_pattern: Pattern, capacity: usize, value_based: bool) {
    if let Some(idx) = list
        .iter()
        .position(|p| matcher::is_isomorphic(&p.definition, &new_pattern.definition))
    {
        if list[idx].value >= new_pattern.value {
            return;
        }
        list.remove(idx);
    }

    let insert_at = list
        .iter()
        .position(|p| new_pattern.value > p.value)
        .unwrap_or(list.len());
    list.insert(insert_at, new_pattern);

    if value_based {
        // `list` is kept sorted non-increasing, so equal values are always
        // adjacent -- a dedup scan is enough to count distinct values.
        let unique_values: Vec<f64> = list.iter().map(|p| p.value).dedup().collect();
        if unique_values.len() > capacity {
            let remove_value = *unique_values.last().expect("just checked non-empty");
            while list.last().map(|p| p.value) == Some(remove_value) {
                list.pop();
            }
        }
    } else if list.len() > capacity {
        list.pop();
    }
}
