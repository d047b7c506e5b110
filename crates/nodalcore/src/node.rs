use crate::edge::EdgeSummary;
use crate::error::NodeError;
use crate::params::{ParameterBinding, ParameterStore};
use crate::value::{Value, ValueKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type NodeId = Uuid;

/// Which side of a node a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Input,
    Output,
}

/// Static description of one port.
///
/// Identity within a node is `(field, ident)`; the optional identifier
/// distinguishes the ports a dynamic field fans out into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDescriptor {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ident: Option<String>,
    pub display_name: String,
    pub kind: ValueKind,
    pub direction: Direction,
    pub accept_multiple_edges: bool,
}

impl PortDescriptor {
    pub fn input(field: impl Into<String>, kind: ValueKind) -> Self {
        let field = field.into();
        Self {
            display_name: field.clone(),
            field,
            ident: None,
            kind,
            direction: Direction::Input,
            accept_multiple_edges: false,
        }
    }

    pub fn output(field: impl Into<String>, kind: ValueKind) -> Self {
        let field = field.into();
        Self {
            display_name: field.clone(),
            field,
            ident: None,
            kind,
            direction: Direction::Output,
            // Outputs fan out by default
            accept_multiple_edges: true,
        }
    }

    pub fn with_ident(mut self, ident: impl Into<String>) -> Self {
        self.ident = Some(ident.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn multi(mut self) -> Self {
        self.accept_multiple_edges = true;
        self
    }

    pub fn single(mut self) -> Self {
        self.accept_multiple_edges = false;
        self
    }
}

/// A port's address within its node, handed to `pull_input`/`push_output`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ident: Option<String>,
}

impl PortRef {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ident: None,
        }
    }

    pub fn with_ident(field: impl Into<String>, ident: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ident: Some(ident.into()),
        }
    }
}

impl std::fmt::Display for PortRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.ident {
            Some(ident) => write!(f, "{}#{}", self.field, ident),
            None => f.write_str(&self.field),
        }
    }
}

/// The full port declaration of a node type: static descriptors plus the
/// fields whose port list is regenerated from connected edges.
#[derive(Debug, Clone, Default)]
pub struct NodeLayout {
    pub inputs: Vec<PortDescriptor>,
    pub outputs: Vec<PortDescriptor>,
    pub dynamic_fields: Vec<String>,
}

impl NodeLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, descriptor: PortDescriptor) -> Self {
        self.inputs.push(descriptor);
        self
    }

    pub fn output(mut self, descriptor: PortDescriptor) -> Self {
        self.outputs.push(descriptor);
        self
    }

    pub fn dynamic(mut self, field: impl Into<String>) -> Self {
        self.dynamic_fields.push(field.into());
        self
    }

    pub fn is_dynamic(&self, field: &str) -> bool {
        self.dynamic_fields.iter().any(|f| f == field)
    }
}

/// Per-run context handed to `process`.
pub struct ProcessContext {
    pub node_id: NodeId,
    params: ParameterStore,
}

impl ProcessContext {
    pub fn new(node_id: NodeId, params: ParameterStore) -> Self {
        Self { node_id, params }
    }

    pub fn parameter(&self, name: &str) -> Option<Value> {
        self.params.get(name)
    }

    pub fn set_parameter(&self, name: impl Into<String>, value: Value) {
        self.params.set(name, value);
    }
}

/// A unit of computation in the graph.
///
/// Implementations declare their ports up front via [`Node::layout`] and
/// move data in three synchronous steps driven by the processor: the engine
/// hands incoming edge values to `pull_input`, runs `process`, then copies
/// `push_output` values onto outgoing edges. None of the steps may block.
pub trait Node: Send {
    /// Stable type tag, also used as the serialization tag.
    fn type_name(&self) -> &str;

    fn layout(&self) -> NodeLayout;

    /// One-shot hook run when the node is added to a graph.
    fn init(&mut self, _params: &ParameterStore) {}

    /// Nodes reporting `false` are excluded from execution (rank -1).
    fn can_process(&self) -> bool {
        true
    }

    /// Receive the buffered values of one input port's connected edges, in
    /// port order, already converted to the port's declared kind. The
    /// default 1:1 wiring delivers a single value; multi-edge and dynamic
    /// fields get the whole batch and assemble it themselves.
    fn pull_input(&mut self, _port: &PortRef, _values: Vec<Value>) -> Result<(), NodeError> {
        Ok(())
    }

    /// Transform pulled inputs into output state. Failures are recorded
    /// against the node and do not abort the surrounding run.
    fn process(&mut self, ctx: &mut ProcessContext) -> Result<(), NodeError>;

    /// Produce the value for one output port, or `None` to leave its edges
    /// untouched.
    fn push_output(&self, port: &PortRef) -> Option<Value>;

    /// Regenerate the port list of a dynamic field from its current edges.
    /// Must return `None` for static fields. Descriptor order is preserved.
    fn dynamic_ports(
        &self,
        _field: &str,
        _edges: &[EdgeSummary],
    ) -> Option<Vec<PortDescriptor>> {
        None
    }

    /// Parameter this node reads or writes, used for implicit ordering of
    /// setters before getters of the same name.
    fn parameter_binding(&self) -> Option<ParameterBinding> {
        None
    }

    /// Opaque serialization payload, restored through the node's factory.
    fn save(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}
