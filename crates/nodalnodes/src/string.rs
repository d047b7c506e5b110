use crate::parse_config;
use nodalcore::{
    Node, NodeError, NodeLayout, PortDescriptor, PortRef, ProcessContext, Value, ValueKind,
};
use nodalruntime::{NodeFactory, NodeTypeInfo};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConcatConfig {
    separator: String,
}

impl Default for ConcatConfig {
    fn default() -> Self {
        Self {
            separator: String::new(),
        }
    }
}

/// Joins every connected string input with a configured separator.
pub struct ConcatNode {
    separator: String,
    parts: Vec<String>,
    result: String,
}

impl ConcatNode {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            parts: Vec::new(),
            result: String::new(),
        }
    }
}

impl Node for ConcatNode {
    fn type_name(&self) -> &str {
        "string.concat"
    }

    fn layout(&self) -> NodeLayout {
        NodeLayout::new()
            .input(PortDescriptor::input("parts", ValueKind::String).multi())
            .output(PortDescriptor::output("out", ValueKind::String))
    }

    fn pull_input(&mut self, port: &PortRef, values: Vec<Value>) -> Result<(), NodeError> {
        if port.field != "parts" {
            return Ok(());
        }
        self.parts = values
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or(NodeError::InvalidInputType {
                    field: port.field.clone(),
                    expected: ValueKind::String,
                    actual: v.kind(),
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    fn process(&mut self, _ctx: &mut ProcessContext) -> Result<(), NodeError> {
        self.result = self.parts.join(&self.separator);
        Ok(())
    }

    fn push_output(&self, port: &PortRef) -> Option<Value> {
        (port.field == "out").then(|| Value::String(self.result.clone()))
    }

    fn save(&self) -> serde_json::Value {
        json!({ "separator": self.separator })
    }
}

pub struct ConcatNodeFactory;

impl NodeFactory for ConcatNodeFactory {
    fn type_name(&self) -> &str {
        "string.concat"
    }

    fn create(&self, payload: &serde_json::Value) -> Result<Box<dyn Node>, NodeError> {
        let config: ConcatConfig = parse_config(payload)?;
        Ok(Box::new(ConcatNode::new(config.separator)))
    }

    fn info(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            description: "Join connected strings with a separator".to_string(),
            category: "string".to_string(),
        }
    }
}
