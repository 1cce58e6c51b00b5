//! JSON wire format: an array of single-key objects, each either
//! `{"vertex": {...}}` or `{"edge": {...}}`, vertices preceding any edge
//! that references them.

use super::{AttributeMap, Edge, Graph, Vertex};
use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
enum GraphObject {
    Vertex(VertexDto),
    Edge(EdgeDto),
}

#[derive(Debug, Deserialize, Serialize)]
struct VertexDto {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(default)]
    attributes: AttributeMap,
}

#[derive(Debug, Deserialize, Serialize)]
struct EdgeDto {
    id: String,
    source: String,
    target: String,
    directed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(default)]
    attributes: AttributeMap,
}

fn parse_timestamp(object_id: &str, raw: &Option<String>) -> Result<i64, GraphError> {
    match raw {
        None => Ok(0),
        Some(s) => s.parse::<i64>().map_err(|_| GraphError::InvalidTimestamp {
            object: object_id.to_string(),
            value: s.clone(),
        }),
    }
}

fn parse_directed(raw: &str) -> bool {
    raw == "true" || raw == "True"
}

/// Loads a graph from the array-of-objects JSON format, in file order.
pub fn load(path: impl AsRef<Path>) -> Result<Graph, GraphError> {
    let file = File::open(path)?;
    let objects: Vec<GraphObject> = serde_json::from_reader(BufReader::new(file))?;
    let mut graph = Graph::new();

    for object in objects {
        match object {
            GraphObject::Vertex(dto) => {
                let timestamp = parse_timestamp(&dto.id, &dto.timestamp)?;
                let mut vertex = Vertex::new(Rc::from(dto.id.as_str()));
                vertex.timestamp = timestamp;
                vertex.attributes = dto.attributes;
                graph.add_vertex(vertex)?;
            }
            GraphObject::Edge(dto) => {
                let timestamp = parse_timestamp(&dto.id, &dto.timestamp)?;
                let mut edge = Edge::new(
                    Rc::from(dto.id.as_str()),
                    Rc::from(dto.source.as_str()),
                    Rc::from(dto.target.as_str()),
                    parse_directed(&dto.directed),
                );
                edge.timestamp = timestamp;
                edge.attributes = dto.attributes;
                graph.add_edge(edge)?;
            }
        }
    }
    Ok(graph)
}

fn vertex_to_dto(vertex: &Vertex) -> GraphObject {
    GraphObject::Vertex(VertexDto {
        id: vertex.id.to_string(),
        timestamp: Some(vertex.timestamp.to_string()),
        attributes: vertex.attributes.clone(),
    })
}

fn edge_to_dto(edge: &Edge) -> GraphObject {
    GraphObject::Edge(EdgeDto {
        id: edge.id.to_string(),
        source: edge.source.to_string(),
        target: edge.target.to_string(),
        directed: edge.directed.to_string(),
        timestamp: Some(edge.timestamp.to_string()),
        attributes: edge.attributes.clone(),
    })
}

/// Writes a graph to the array-of-objects JSON format: all vertices, then
/// all edges, each in insertion order.
pub fn save(graph: &Graph, path: impl AsRef<Path>) -> Result<(), GraphError> {
    let objects: Vec<GraphObject> = graph
        .vertices()
        .map(vertex_to_dto)
        .chain(graph.edges().map(edge_to_dto))
        .collect();
    write_objects(&objects, path)
}

/// Writes a pattern's instances as one JSON array: per instance, its
/// vertices then its edges, back to back. Used for the
/// `-instances-<i>.json` output; ids repeat across instances, so the result
/// is not a reloadable graph, only useful for inspection.
pub fn save_instances(
    instances: &[(Vec<&Vertex>, Vec<&Edge>)],
    path: impl AsRef<Path>,
) -> Result<(), GraphError> {
    let mut objects = Vec::new();
    for (vertices, edges) in instances {
        objects.extend(vertices.iter().map(|v| vertex_to_dto(v)));
        objects.extend(edges.iter().map(|e| edge_to_dto(e)));
    }
    write_objects(&objects, path)
}

fn write_objects(objects: &[GraphObject], path: impl AsRef<Path>) -> Result<(), GraphError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, objects)?;
    writer.flush()?;
    Ok(())
}
