//! Constant-value source nodes.

use crate::parse_config;
use nodalcore::{
    Node, NodeError, NodeLayout, PortDescriptor, PortRef, ProcessContext, Value, ValueKind,
};
use nodalruntime::{NodeFactory, NodeTypeInfo};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Emits a configured integer
pub struct IntNode {
    value: i64,
}

impl IntNode {
    pub fn new(value: i64) -> Self {
        Self { value }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct IntConfig {
    value: i64,
}

impl Node for IntNode {
    fn type_name(&self) -> &str {
        "value.int"
    }

    fn layout(&self) -> NodeLayout {
        NodeLayout::new().output(PortDescriptor::output("out", ValueKind::Int))
    }

    fn process(&mut self, _ctx: &mut ProcessContext) -> Result<(), NodeError> {
        Ok(())
    }

    fn push_output(&self, port: &PortRef) -> Option<Value> {
        (port.field == "out").then(|| Value::Int(self.value))
    }

    fn save(&self) -> serde_json::Value {
        json!({ "value": self.value })
    }
}

pub struct IntNodeFactory;

impl NodeFactory for IntNodeFactory {
    fn type_name(&self) -> &str {
        "value.int"
    }

    fn create(&self, payload: &serde_json::Value) -> Result<Box<dyn Node>, NodeError> {
        let config: IntConfig = parse_config(payload)?;
        Ok(Box::new(IntNode::new(config.value)))
    }

    fn info(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            description: "Constant integer value".to_string(),
            category: "value".to_string(),
        }
    }
}

/// Emits a configured float
pub struct FloatNode {
    value: f64,
}

impl FloatNode {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FloatConfig {
    value: f64,
}

impl Node for FloatNode {
    fn type_name(&self) -> &str {
        "value.float"
    }

    fn layout(&self) -> NodeLayout {
        NodeLayout::new().output(PortDescriptor::output("out", ValueKind::Float))
    }

    fn process(&mut self, _ctx: &mut ProcessContext) -> Result<(), NodeError> {
        Ok(())
    }

    fn push_output(&self, port: &PortRef) -> Option<Value> {
        (port.field == "out").then(|| Value::Float(self.value))
    }

    fn save(&self) -> serde_json::Value {
        json!({ "value": self.value })
    }
}

pub struct FloatNodeFactory;

impl NodeFactory for FloatNodeFactory {
    fn type_name(&self) -> &str {
        "value.float"
    }

    fn create(&self, payload: &serde_json::Value) -> Result<Box<dyn Node>, NodeError> {
        let config: FloatConfig = parse_config(payload)?;
        Ok(Box::new(FloatNode::new(config.value)))
    }

    fn info(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            description: "Constant float value".to_string(),
            category: "value".to_string(),
        }
    }
}

/// Emits a configured string
pub struct StringNode {
    value: String,
}

impl StringNode {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StringConfig {
    value: String,
}

impl Node for StringNode {
    fn type_name(&self) -> &str {
        "value.string"
    }

    fn layout(&self) -> NodeLayout {
        NodeLayout::new().output(PortDescriptor::output("out", ValueKind::String))
    }

    fn process(&mut self, _ctx: &mut ProcessContext) -> Result<(), NodeError> {
        Ok(())
    }

    fn push_output(&self, port: &PortRef) -> Option<Value> {
        (port.field == "out").then(|| Value::String(self.value.clone()))
    }

    fn save(&self) -> serde_json::Value {
        json!({ "value": self.value })
    }
}

pub struct StringNodeFactory;

impl NodeFactory for StringNodeFactory {
    fn type_name(&self) -> &str {
        "value.string"
    }

    fn create(&self, payload: &serde_json::Value) -> Result<Box<dyn Node>, NodeError> {
        let config: StringConfig = parse_config(payload)?;
        Ok(Box::new(StringNode::new(config.value)))
    }

    fn info(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            description: "Constant string value".to_string(),
            category: "value".to_string(),
        }
    }
}

/// Emits a configured boolean
pub struct BoolNode {
    value: bool,
}

impl BoolNode {
    pub fn new(value: bool) -> Self {
        Self { value }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BoolConfig {
    value: bool,
}

impl Node for BoolNode {
    fn type_name(&self) -> &str {
        "value.bool"
    }

    fn layout(&self) -> NodeLayout {
        NodeLayout::new().output(PortDescriptor::output("out", ValueKind::Bool))
    }

    fn process(&mut self, _ctx: &mut ProcessContext) -> Result<(), NodeError> {
        Ok(())
    }

    fn push_output(&self, port: &PortRef) -> Option<Value> {
        (port.field == "out").then(|| Value::Bool(self.value))
    }

    fn save(&self) -> serde_json::Value {
        json!({ "value": self.value })
    }
}

pub struct BoolNodeFactory;

impl NodeFactory for BoolNodeFactory {
    fn type_name(&self) -> &str {
        "value.bool"
    }

    fn create(&self, payload: &serde_json::Value) -> Result<Box<dyn Node>, NodeError> {
        let config: BoolConfig = parse_config(payload)?;
        Ok(Box::new(BoolNode::new(config.value)))
    }

    fn info(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            description: "Constant boolean value".to_string(),
            category: "value".to_string(),
        }
    }
}
