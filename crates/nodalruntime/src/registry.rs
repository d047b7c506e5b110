use crate::error::DocumentError;
use nodalcore::{Node, NodeError};
use std::collections::HashMap;
use std::sync::Arc;

/// Factory trait for creating node instances from their serialized payload
pub trait NodeFactory: Send + Sync {
    /// Node type identifier, also the document type tag
    fn type_name(&self) -> &str;

    /// Create a new instance. `payload` is whatever a previous
    /// `Node::save` produced, or `null` for a fresh node.
    fn create(&self, payload: &serde_json::Value) -> Result<Box<dyn Node>, NodeError>;

    /// Optional: descriptive metadata for tooling
    fn info(&self) -> NodeTypeInfo {
        NodeTypeInfo::default()
    }
}

/// Metadata about a node type
#[derive(Debug, Clone)]
pub struct NodeTypeInfo {
    pub description: String,
    pub category: String,
}

impl Default for NodeTypeInfo {
    fn default() -> Self {
        Self {
            description: String::new(),
            category: "general".to_string(),
        }
    }
}

/// Registry of available node types
pub struct NodeRegistry {
    factories: HashMap<String, Arc<dyn NodeFactory>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a node factory
    pub fn register(&mut self, factory: Arc<dyn NodeFactory>) {
        let type_name = factory.type_name().to_string();
        tracing::info!("Registering node type: {}", type_name);
        self.factories.insert(type_name, factory);
    }

    /// Create a node instance from a type tag and payload
    pub fn create_node(
        &self,
        type_tag: &str,
        payload: &serde_json::Value,
    ) -> Result<Box<dyn Node>, DocumentError> {
        let factory = self
            .factories
            .get(type_tag)
            .ok_or_else(|| DocumentError::UnknownNodeType(type_tag.to_string()))?;
        factory.create(payload).map_err(DocumentError::Node)
    }

    /// All registered node types, sorted for stable output
    pub fn list_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.factories.keys().cloned().collect();
        types.sort();
        types
    }

    /// Get metadata for a node type
    pub fn info(&self, type_tag: &str) -> Option<NodeTypeInfo> {
        self.factories.get(type_tag).map(|f| f.info())
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
