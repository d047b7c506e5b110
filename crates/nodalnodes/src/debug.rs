use crate::parse_config;
use nodalcore::{
    Node, NodeError, NodeLayout, PortDescriptor, PortRef, ProcessContext, Value, ValueKind,
};
use nodalruntime::{NodeFactory, NodeTypeInfo};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LogConfig {
    label: String,
}

/// Logs its input and passes it through unchanged.
pub struct LogNode {
    label: String,
    value: Value,
}

impl LogNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: Value::Null,
        }
    }
}

impl Node for LogNode {
    fn type_name(&self) -> &str {
        "debug.log"
    }

    fn layout(&self) -> NodeLayout {
        NodeLayout::new()
            .input(PortDescriptor::input("in", ValueKind::Any))
            .output(PortDescriptor::output("out", ValueKind::Any))
    }

    fn pull_input(&mut self, port: &PortRef, values: Vec<Value>) -> Result<(), NodeError> {
        if port.field == "in" {
            if let Some(value) = values.into_iter().next() {
                self.value = value;
            }
        }
        Ok(())
    }

    fn process(&mut self, _ctx: &mut ProcessContext) -> Result<(), NodeError> {
        tracing::info!(label = %self.label, value = ?self.value, "debug.log");
        Ok(())
    }

    fn push_output(&self, port: &PortRef) -> Option<Value> {
        (port.field == "out").then(|| self.value.clone())
    }

    fn save(&self) -> serde_json::Value {
        json!({ "label": self.label })
    }
}

pub struct LogNodeFactory;

impl NodeFactory for LogNodeFactory {
    fn type_name(&self) -> &str {
        "debug.log"
    }

    fn create(&self, payload: &serde_json::Value) -> Result<Box<dyn Node>, NodeError> {
        let config: LogConfig = parse_config(payload)?;
        Ok(Box::new(LogNode::new(config.label)))
    }

    fn info(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            description: "Log the input value and pass it through".to_string(),
            category: "debug".to_string(),
        }
    }
}
