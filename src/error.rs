use thiserror::Error;

/// Errors arising while constructing or loading a [`crate::graph::Graph`].
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("JSON format error")]
    Json(#[from] serde_json::Error),

    #[error("edge {edge:?} references unknown vertex {vertex:?}")]
    UnknownEndpoint { edge: String, vertex: String },

    #[error("duplicate vertex id {0:?}")]
    DuplicateVertex(String),

    #[error("duplicate edge id {0:?}")]
    DuplicateEdge(String),

    #[error("invalid timestamp {value:?} on {object:?}")]
    InvalidTimestamp { object: String, value: String },
}
