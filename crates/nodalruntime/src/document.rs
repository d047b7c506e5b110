//! Graph persistence: a plain JSON document of typed node records with
//! opaque payloads, edge records, and graph-level parameters.
//!
//! Loading is lossy by design: nodes whose type tag is unknown or whose
//! payload fails to restore are dropped with a warning, and so is every
//! edge that cannot be re-established. The remaining graph stays usable.

use crate::error::DocumentError;
use crate::registry::NodeRegistry;
use nodalcore::{EdgeId, Graph, NodeId, OrderingStrategy, PortAddress, TypeAdapters, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: EdgeId,
    pub from: PortAddress,
    pub to: PortAddress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDocument {
    pub name: String,
    #[serde(default)]
    pub strategy: OrderingStrategy,
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

/// Capture a graph as a serializable document. Pass-through buffers and
/// cached ranks are transient and not persisted.
pub fn save_graph(graph: &Graph) -> GraphDocument {
    GraphDocument {
        name: graph.name().to_string(),
        strategy: graph.strategy(),
        parameters: graph.params().snapshot(),
        nodes: graph
            .nodes()
            .map(|(id, handle)| NodeRecord {
                id,
                type_tag: handle.type_name().to_string(),
                payload: handle
                    .node()
                    .map(|n| n.save())
                    .unwrap_or(serde_json::Value::Null),
            })
            .collect(),
        edges: graph
            .edges()
            .map(|edge| EdgeRecord {
                id: edge.id,
                from: edge.from.clone(),
                to: edge.to.clone(),
            })
            .collect(),
    }
}

/// Rebuild a graph from a document. Edges go through the normal `connect`
/// path so validation and dynamic-port reconciliation run; a final sweep
/// drops whatever could not be resolved.
pub fn load_graph(
    document: &GraphDocument,
    registry: &NodeRegistry,
    adapters: Arc<TypeAdapters>,
) -> Graph {
    let mut graph = Graph::new(document.name.clone(), adapters).with_strategy(document.strategy);
    graph.params().restore(document.parameters.clone());
    for record in &document.nodes {
        match registry.create_node(&record.type_tag, &record.payload) {
            Ok(node) => {
                if let Err(err) = graph.add_node_with_id(record.id, node) {
                    tracing::warn!(node = %record.id, error = %err, "dropping duplicate node");
                }
            }
            Err(err) => {
                tracing::warn!(
                    node = %record.id,
                    node_type = %record.type_tag,
                    error = %err,
                    "dropping unrestorable node"
                );
            }
        }
    }
    for record in &document.edges {
        if let Err(err) =
            graph.connect_with_id(record.id, record.from.clone(), record.to.clone(), true)
        {
            tracing::warn!(edge = %record.id, error = %err, "dropping unrestorable edge");
        }
    }
    graph.sweep_broken_elements();
    graph
}

pub fn read_file(path: impl AsRef<Path>) -> Result<GraphDocument, DocumentError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

pub fn write_file(path: impl AsRef<Path>, document: &GraphDocument) -> Result<(), DocumentError> {
    let text = serde_json::to_string_pretty(document)?;
    std::fs::write(path, text)?;
    Ok(())
}
