//! Approximate graph isomorphism matcher.
//!
//! Searches for a bijection between the *edges* of two small graphs (never
//! the whole input graph -- only pattern definition graphs, which stay
//! small because of `maxSize`). The search is bounded by a budget of
//! `|E|^2` partial-mapping attempts, scoped to one top-level call: unlike
//! the original implementation this budget is never a module-level global,
//! so nothing here prevents running several matches concurrently later.

use crate::graph::{AttributeMap, EdgeId, Graph, VertexId};
use std::collections::{HashMap, HashSet};

/// Compares attribute maps by sorted key-value pairs rather than relying on
/// `IndexMap`'s own `PartialEq`, so matching stays correct even if that
/// changes shape (e.g. case-insensitive or ordered comparisons) upstream.
fn attributes_match(a: &AttributeMap, b: &AttributeMap) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a_sorted: Vec<(&String, &String)> = a.iter().collect();
    let mut b_sorted: Vec<(&String, &String)> = b.iter().collect();
    a_sorted.sort_unstable();
    b_sorted.sort_unstable();
    a_sorted == b_sorted
}

/// Returns true if `g1` and `g2` are isomorphic given the matcher's budget.
/// May return false on genuinely isomorphic pairs once the budget is
/// exhausted (approximate, one-sided toward false negatives).
pub fn is_isomorphic(g1: &Graph, g2: &Graph) -> bool {
    if g1.num_vertices() != g2.num_vertices() {
        return false;
    }
    if g1.num_edges() != g2.num_edges() {
        return false;
    }
    if g1.num_edges() == 0 {
        let v1 = g1.vertices().next().expect("vertex count checked above");
        let v2 = g2.vertices().next().expect("vertex count checked above");
        return vertices_match(g1, &v1.id, g2, &v2.id);
    }

    let budget = (g1.num_edges() as u64).saturating_mul(g1.num_edges() as u64);
    let ctx = MatchCtx { g1, g2, budget };
    let mut mapping = HashMap::new();
    let mut used = HashSet::new();
    let mut attempts = 0u64;
    ctx.extend_mapping(&mut mapping, &mut used, &mut attempts)
}

/// Unbounded backtracking match, used only to differentially test
/// [`is_isomorphic`] against a known-correct (but exponential) reference on
/// small graphs.
#[cfg(test)]
pub fn is_isomorphic_exact(g1: &Graph, g2: &Graph) -> bool {
    if g1.num_vertices() != g2.num_vertices() || g1.num_edges() != g2.num_edges() {
        return false;
    }
    if g1.num_edges() == 0 {
        let v1 = g1.vertices().next().expect("vertex count checked above");
        let v2 = g2.vertices().next().expect("vertex count checked above");
        return vertices_match(g1, &v1.id, g2, &v2.id);
    }
    let ctx = MatchCtx {
        g1,
        g2,
        budget: u64::MAX,
    };
    let mut mapping = HashMap::new();
    let mut used = HashSet::new();
    let mut attempts = 0u64;
    ctx.extend_mapping(&mut mapping, &mut used, &mut attempts)
}

struct MatchCtx<'a> {
    g1: &'a Graph,
    g2: &'a Graph,
    budget: u64,
}

impl<'a> MatchCtx<'a> {
    fn extend_mapping(
        &self,
        mapping: &mut HashMap<EdgeId, EdgeId>,
        used: &mut HashSet<EdgeId>,
        attempts: &mut u64,
    ) -> bool {
        if mapping.len() == self.g1.num_edges() {
            return true;
        }
        if *attempts > self.budget {
            return false;
        }

        let edge1_id = self
            .g1
            .edges()
            .map(|e| e.id.clone())
            .find(|id| !mapping.contains_key(id))
            .expect("an unmapped edge must exist while mapping is incomplete");

        for edge2 in self.g2.edges() {
            if used.contains(&edge2.id) {
                continue;
            }
            if self.edges_match(&edge1_id, &edge2.id) {
                mapping.insert(edge1_id.clone(), edge2.id.clone());
                used.insert(edge2.id.clone());
                *attempts += 1;
                if self.extend_mapping(mapping, used, attempts) {
                    return true;
                }
                mapping.remove(&edge1_id);
                used.remove(&edge2.id);
            }
        }
        false
    }

    fn edges_match(&self, edge1_id: &str, edge2_id: &str) -> bool {
        let edge1 = self.g1.edge(edge1_id).expect("edge1 must exist");
        let edge2 = self.g2.edge(edge2_id).expect("edge2 must exist");

        if !attributes_match(&edge1.attributes, &edge2.attributes) {
            return false;
        }
        if edge1.directed != edge2.directed {
            return false;
        }
        if edge1.temporal_rank != edge2.temporal_rank {
            return false;
        }

        if vertices_match(self.g1, &edge1.source, self.g2, &edge2.source)
            && vertices_match(self.g1, &edge1.target, self.g2, &edge2.target)
        {
            return true;
        }
        if !edge1.directed
            && vertices_match(self.g1, &edge1.source, self.g2, &edge2.target)
            && vertices_match(self.g1, &edge1.target, self.g2, &edge2.source)
        {
            return true;
        }
        false
    }
}

fn vertices_match(g1: &Graph, id1: &VertexId, g2: &Graph, id2: &VertexId) -> bool {
    let v1 = g1.vertex(id1).expect("vertex1 must exist");
    let v2 = g2.vertex(id2).expect("vertex2 must exist");
    attributes_match(&v1.attributes, &v2.attributes)
        && v1.adjacency.len() == v2.adjacency.len()
        && v1.temporal_rank == v2.temporal_rank
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Vertex};
    use std::rc::Rc;

    fn triangle(prefix: &str) -> Graph {
        let mut g = Graph::new();
        for n in ["a", "b", "c"] {
            let mut v = Vertex::new(Rc::from(format!("{prefix}{n}").as_str()));
            v.attributes.insert("label".into(), "X".into());
            g.add_vertex(v).unwrap();
        }
        let edges = [("a", "b"), ("b", "c"), ("c", "a")];
        for (i, (s, t)) in edges.iter().enumerate() {
            let mut e = Edge::new(
                Rc::from(format!("{prefix}e{i}").as_str()),
                Rc::from(format!("{prefix}{s}").as_str()),
                Rc::from(format!("{prefix}{t}").as_str()),
                false,
            );
            e.attributes.insert("type".into(), "e".into());
            g.add_edge(e).unwrap();
        }
        g
    }

    #[test]
    fn edgeless_graphs_always_match_themselves() {
        let mut g = Graph::new();
        g.add_vertex(Vertex::new(Rc::from("1"))).unwrap();
        assert!(is_isomorphic(&g, &g));
    }

    #[test]
    fn different_vertex_counts_reject_without_search() {
        let mut g1 = Graph::new();
        g1.add_vertex(Vertex::new(Rc::from("1"))).unwrap();
        let mut g2 = Graph::new();
        g2.add_vertex(Vertex::new(Rc::from("1"))).unwrap();
        g2.add_vertex(Vertex::new(Rc::from("2"))).unwrap();
        assert!(!is_isomorphic(&g1, &g2));
    }

    #[test]
    fn two_identical_triangles_match() {
        let t1 = triangle("a");
        let t2 = triangle("b");
        assert!(is_isomorphic(&t1, &t2));
        assert_eq!(is_isomorphic(&t1, &t2), is_isomorphic_exact(&t1, &t2));
    }

    #[test]
    fn directed_vs_undirected_two_vertex_graphs_do_not_match() {
        let mut directed = Graph::new();
        directed.add_vertex(Vertex::new(Rc::from("1"))).unwrap();
        directed.add_vertex(Vertex::new(Rc::from("2"))).unwrap();
        directed
            .add_edge(Edge::new(Rc::from("e"), Rc::from("1"), Rc::from("2"), true))
            .unwrap();

        let mut undirected = Graph::new();
        undirected.add_vertex(Vertex::new(Rc::from("1"))).unwrap();
        undirected.add_vertex(Vertex::new(Rc::from("2"))).unwrap();
        undirected
            .add_edge(Edge::new(
                Rc::from("e"),
                Rc::from("1"),
                Rc::from("2"),
                false,
            ))
            .unwrap();

        assert!(!is_isomorphic(&directed, &undirected));
    }
}
