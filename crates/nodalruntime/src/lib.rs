//! Execution drivers and persistence for node graphs
//!
//! `GraphProcessor` is the reference synchronous executor;
//! `ParallelProcessor` is an optional tokio-backed scheduler with the same
//! per-node semantics. `NodeRegistry` maps document type tags to factories,
//! and the `document` functions move whole graphs to and from JSON.

mod document;
mod error;
mod parallel;
mod processor;
mod registry;

pub use document::{
    load_graph, read_file, save_graph, write_file, EdgeRecord, GraphDocument, NodeRecord,
};
pub use error::DocumentError;
pub use parallel::{ParallelConfig, ParallelProcessor};
pub use processor::{
    GraphProcessor, NodeFailure, ProcessorConfig, ProcessorState, RunReport,
};
pub use registry::{NodeFactory, NodeRegistry, NodeTypeInfo};
