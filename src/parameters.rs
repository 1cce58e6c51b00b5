//! Run-wide discovery settings, with the same zero-means-derive-from-graph
//! defaulting Subdue's CLI applies once the input graph is known.

use crate::graph::Graph;
use crate::pattern::OverlapPolicy;
use clap::Args;

#[derive(Debug, Clone, Args)]
pub struct Parameters {
    /// Patterns retained after each expansion round, ranked by value.
    #[arg(long = "beam", default_value_t = 4)]
    pub beam_width: usize,

    /// Compress-and-rerun rounds. 0 means run until the graph stops shrinking.
    #[arg(long, default_value_t = 1)]
    pub iterations: usize,

    /// Patterns considered before stopping early. 0 means |E|/2.
    #[arg(long, default_value_t = 0)]
    pub limit: usize,

    /// Maximum pattern size in edges. 0 means |E|/2.
    #[arg(long = "maxsize", default_value_t = 0)]
    pub max_size: usize,

    /// Minimum pattern size in edges to be reported.
    #[arg(long = "minsize", default_value_t = 1)]
    pub min_size: usize,

    /// Number of best patterns to report per iteration.
    #[arg(long = "numbest", default_value_t = 3)]
    pub num_best: usize,

    /// How much pattern instances within one pattern may overlap.
    #[arg(long, value_enum, default_value = "none")]
    pub overlap: OverlapPolicy,

    /// Drop extensions that score worse than their parent.
    #[arg(long, default_value_t = false)]
    pub prune: bool,

    /// Cap beam_width/num_best by distinct values rather than pattern count.
    #[arg(long = "valuebased", default_value_t = false)]
    pub value_based: bool,

    /// Use temporal rank instead of raw timestamps when matching.
    #[arg(long, default_value_t = false)]
    pub temporal: bool,

    /// Write the compressed graph after the final iteration.
    #[arg(long = "writecompressed", default_value_t = false)]
    pub write_compressed: bool,

    /// Write the best pattern's definition graph per iteration.
    #[arg(long = "writepattern", default_value_t = false)]
    pub write_pattern: bool,

    /// Write the best pattern's instances per iteration.
    #[arg(long = "writeinstances", default_value_t = false)]
    pub write_instances: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            beam_width: 4,
            iterations: 1,
            limit: 0,
            max_size: 0,
            min_size: 1,
            num_best: 3,
            overlap: OverlapPolicy::None,
            prune: false,
            value_based: false,
            temporal: false,
            write_compressed: false,
            write_pattern: false,
            write_instances: false,
        }
    }
}

impl Parameters {
    /// Resolves the `0`-means-derive-from-graph defaults for `limit`,
    /// `max_size`, and `iterations` against the graph's edge count at the
    /// start of a run. Call once, before [`crate::discovery::run`] -- the
    /// resolved values hold for every iteration, even as compression
    /// shrinks the graph.
    pub fn resolve_defaults(&mut self, graph: &Graph) {
        if self.limit == 0 {
            self.limit = graph.num_edges() / 2;
        }
        if self.max_size == 0 {
            self.max_size = graph.num_edges() / 2;
        }
        if self.iterations == 0 {
            self.iterations = graph.num_edges();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Vertex};
    use std::rc::Rc;

    fn graph_with_edges(n: usize) -> Graph {
        let mut g = Graph::new();
        for i in 0..=n {
            g.add_vertex(Vertex::new(Rc::from(i.to_string().as_str()))).unwrap();
        }
        for i in 0..n {
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
    fn zero_limit_and_max_size_derive_half_edge_count() {
        let graph = graph_with_edges(10);
        let mut params = Parameters { limit: 0, max_size: 0, ..Parameters::default() };
        params.resolve_defaults(&graph);
        assert_eq!(params.limit, 5);
        assert_eq!(params.max_size, 5);
    }

    #[test]
    fn nonzero_limit_is_left_untouched() {
        let graph = graph_with_edges(10);
        let mut params = Parameters { limit: 7, ..Parameters::default() };
        params.resolve_defaults(&graph);
        assert_eq!(params.limit, 7);
    }

    #[test]
    fn zero_iterations_derives_edge_count() {
        let graph = graph_with_edges(6);
        let mut params = Parameters { iterations: 0, ..Parameters::default() };
        params.resolve_defaults(&graph);
        assert_eq!(params.iterations, 6);
    }
}
