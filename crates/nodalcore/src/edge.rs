use crate::node::NodeId;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type EdgeId = Uuid;

/// Fully qualified port location: owning node plus the port's `(field,
/// ident)` pair. Edges store addresses, not references; the graph's lookup
/// tables resolve them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortAddress {
    pub node: NodeId,
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ident: Option<String>,
}

impl PortAddress {
    pub fn new(node: NodeId, field: impl Into<String>) -> Self {
        Self {
            node,
            field: field.into(),
            ident: None,
        }
    }

    pub fn with_ident(mut self, ident: impl Into<String>) -> Self {
        self.ident = Some(ident.into());
        self
    }

    pub fn port_name(&self) -> String {
        match &self.ident {
            Some(ident) => format!("{}#{}", self.field, ident),
            None => self.field.clone(),
        }
    }
}

/// A directed connection from an output port to an input port.
///
/// `buffer` is the pass-through value for the current execution pass: the
/// producing node's push writes it, consumer pulls read it. It is reset at
/// the start of every run and never serialized.
#[derive(Debug)]
pub struct Edge {
    pub id: EdgeId,
    pub from: PortAddress,
    pub to: PortAddress,
    pub buffer: Value,
}

impl Edge {
    pub fn new(from: PortAddress, to: PortAddress) -> Self {
        Self::with_id(Uuid::new_v4(), from, to)
    }

    pub fn with_id(id: EdgeId, from: PortAddress, to: PortAddress) -> Self {
        Self {
            id,
            from,
            to,
            buffer: Value::Null,
        }
    }

    pub fn involves_node(&self, node: NodeId) -> bool {
        self.from.node == node || self.to.node == node
    }
}

/// What a dynamic-port callback gets to see about one edge on its field:
/// the edge id and the identifier of the local port it attaches to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeSummary {
    pub id: EdgeId,
    pub ident: Option<String>,
}
