use crate::edge::EdgeId;
use crate::node::NodeId;
use crate::value::ValueKind;
use thiserror::Error;

/// Structural errors raised synchronously by graph mutations. The graph is
/// left unchanged when one of these is returned.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("node {0} is already present in the graph")]
    DuplicateNode(NodeId),

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("port not found: {node}.{port}")]
    PortNotFound { node: NodeId, port: String },

    #[error("edge not found: {0}")]
    EdgeNotFound(EdgeId),

    #[error("edge {0} is already present in the graph")]
    DuplicateEdge(EdgeId),

    #[error("cannot connect a port to itself")]
    SelfConnection,

    #[error("these ports are already connected")]
    AlreadyConnected,

    #[error("port {port} does not accept multiple edges")]
    PortOccupied { port: String },

    #[error("incompatible port types: {from} -> {to}")]
    IncompatibleTypes { from: ValueKind, to: ValueKind },
}

/// Failures local to a single node: bad input, bad configuration, or a
/// failed `process`. The processor records these per node and keeps going.
#[derive(Error, Debug, Clone)]
pub enum NodeError {
    #[error("missing required input: {0}")]
    MissingInput(String),

    #[error("invalid input type for '{field}': expected {expected}, got {actual}")]
    InvalidInputType {
        field: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

/// Run-level failures from the processors.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("compute order is stale; call update_compute_order() first")]
    OrderOutdated,

    #[error("node {node} failed: {message}")]
    NodeFailed { node: NodeId, message: String },

    #[error("run was cancelled before completion")]
    Cancelled,

    #[error("worker task failed: {0}")]
    Worker(String),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}
