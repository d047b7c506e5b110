use nodalcore::NodeError;
use thiserror::Error;

/// Failures while persisting or restoring a graph document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("node error: {0}")]
    Node(#[from] NodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
