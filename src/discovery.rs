//! The beam-search discovery engine and the top-level compress-and-rerun
//! driver.

use crate::error::GraphError;
use crate::graph::{io, Graph};
use crate::parameters::Parameters;
use crate::pattern::{self, group_instances, insert_pattern, Instance, Pattern};
use log::info;

/// One-edge patterns with more than one instance, each evaluated against
/// `graph`.
pub fn initial_patterns(graph: &Graph, parameters: &Parameters) -> Vec<Pattern> {
    let instances: Vec<Instance> = graph
        .edges()
        .map(|edge| Instance::from_edge(graph, &edge.id))
        .collect();
    let mut patterns = group_instances(graph, instances, parameters.overlap, parameters.temporal, true);
    for pattern in patterns.iter_mut() {
        pattern.evaluate(graph);
    }
    patterns
}

fn pop_front(patterns: &mut Vec<Pattern>) -> Option<Pattern> {
    if patterns.is_empty() {
        None
    } else {
        Some(patterns.remove(0))
    }
}

/// The main discovery loop: repeatedly pops the front of a breadth of
/// candidate patterns, extends each by one edge, and folds both the
/// extensions and the parent itself into a `num_best`-capped result list,
/// until `limit` patterns have been considered or nothing is left to try.
pub fn discover_patterns(graph: &Graph, parameters: &Parameters) -> Vec<Pattern> {
    let mut pattern_count = 0usize;
    let mut parent_patterns = initial_patterns(graph, parameters);
    let mut discovered: Vec<Pattern> = Vec::new();

    while pattern_count < parameters.limit && !parent_patterns.is_empty() {
        info!("{} patterns left", parameters.limit - pattern_count);
        let mut child_patterns: Vec<Pattern> = Vec::new();

        while let Some(parent) = pop_front(&mut parent_patterns) {
            if parent.instances.len() > 1 && pattern_count < parameters.limit {
                pattern_count += 1;
                for mut child in parent.extend(graph, parameters.overlap, parameters.temporal) {
                    if child.definition.num_edges() <= parameters.max_size {
                        child.evaluate(graph);
                        if !parameters.prune || child.value >= parent.value {
                            insert_pattern(&mut child_patterns, child, parameters.beam_width, parameters.value_based);
                        }
                    }
                }
            }
            if parent.definition.num_edges() >= parameters.min_size {
                insert_pattern(&mut discovered, parent, parameters.num_best, false);
            }
        }

        parent_patterns = child_patterns;
        if parent_patterns.is_empty() {
            info!("no more patterns to consider");
        }
    }

    while let Some(parent) = pop_front(&mut parent_patterns) {
        if parent.definition.num_edges() >= parameters.min_size {
            insert_pattern(&mut discovered, parent, parameters.num_best, false);
        }
    }
    discovered
}

/// Runs discovery for `parameters.iterations` rounds, compressing `graph`
/// with the best pattern found between rounds and writing the requested
/// `-pattern-<i>.json` / `-instances-<i>.json` / `-compressed-<i>.json`
/// files alongside `output_prefix`. Stops early if a round finds nothing,
/// or if compression has eliminated every edge. Returns the best patterns
/// found in each completed iteration.
pub fn run(graph: &mut Graph, parameters: &Parameters, output_prefix: &str) -> Result<Vec<Vec<Pattern>>, GraphError> {
    let mut iterations_out = Vec::new();
    let mut iteration = 1usize;
    let mut done = false;

    while iteration <= parameters.iterations && !done {
        info!("graph: {} vertices, {} edges", graph.num_vertices(), graph.num_edges());
        let pattern_list = discover_patterns(graph, parameters);

        if pattern_list.is_empty() {
            done = true;
            info!("no patterns found");
        } else {
            info!("best {} patterns found in iteration {iteration}", pattern_list.len());

            if parameters.write_pattern {
                io::save(&pattern_list[0].definition, format!("{output_prefix}-pattern-{iteration}.json"))?;
            }
            if parameters.write_instances {
                let instances: Vec<_> = pattern_list[0]
                    .instances
                    .iter()
                    .map(|instance| (instance.vertex_records(graph), instance.edge_records(graph)))
                    .collect();
                io::save_instances(&instances, format!("{output_prefix}-instances-{iteration}.json"))?;
            }
            if iteration < parameters.iterations || parameters.write_compressed {
                let disjoint = pattern::select_disjoint_instances(&pattern_list[0].instances);
                graph.compress(iteration, &disjoint);
            }
            if iteration < parameters.iterations && graph.num_edges() == 0 {
                done = true;
                info!("ending iterations - graph fully compressed");
            }
            if iteration == parameters.iterations && parameters.write_compressed {
                io::save(graph, format!("{output_prefix}-compressed-{iteration}.json"))?;
            }

            iterations_out.push(pattern_list);
        }
        iteration += 1;
    }
    Ok(iterations_out)
}
