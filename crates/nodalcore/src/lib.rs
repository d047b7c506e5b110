//! Core abstractions for the node graph engine
//!
//! This crate provides the data model (values, nodes, ports, edges, the
//! graph itself), the compute-order algorithms, type adapters, and the
//! change-event bus that everything else builds on. Execution drivers and
//! the node library live in the sibling crates.

mod adapter;
mod edge;
mod error;
mod events;
mod graph;
mod node;
mod ordering;
mod params;
mod port;
mod value;

pub use adapter::{ConvertFn, TypeAdapters};
pub use edge::{Edge, EdgeId, EdgeSummary, PortAddress};
pub use error::{GraphError, NodeError, ProcessError};
pub use events::{EventBus, GraphEvent, RunId};
pub use graph::{Graph, NodeHandle};
pub use node::{
    Direction, Node, NodeId, NodeLayout, PortDescriptor, PortRef, ProcessContext,
};
pub use ordering::{
    OrderingStrategy, INVALID_COMPUTE_ORDER, LOOP_COMPUTE_ORDER, MAX_DEPENDENCY_DEPTH,
};
pub use params::{ParameterBinding, ParameterRole, ParameterStore};
pub use port::{Port, PortContainer};
pub use value::{Value, ValueKind};

/// Result type for graph mutations
pub type Result<T> = std::result::Result<T, GraphError>;
