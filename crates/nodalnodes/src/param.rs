//! Parameter store access by name. Setters of a name are implicit
//! dependencies of its getters, so a same-pass write is observed.

use crate::parse_config;
use nodalcore::{
    Node, NodeError, NodeLayout, ParameterBinding, PortDescriptor, PortRef, ProcessContext, Value,
    ValueKind,
};
use nodalruntime::{NodeFactory, NodeTypeInfo};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ParamConfig {
    name: String,
}

/// Reads a named parameter each pass.
pub struct GetParamNode {
    name: String,
    value: Value,
}

impl GetParamNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Value::Null,
        }
    }
}

impl Node for GetParamNode {
    fn type_name(&self) -> &str {
        "param.get"
    }

    fn layout(&self) -> NodeLayout {
        NodeLayout::new().output(PortDescriptor::output("out", ValueKind::Any))
    }

    fn process(&mut self, ctx: &mut ProcessContext) -> Result<(), NodeError> {
        // An absent parameter reads as null, not as a failure
        self.value = ctx.parameter(&self.name).unwrap_or(Value::Null);
        Ok(())
    }

    fn push_output(&self, port: &PortRef) -> Option<Value> {
        (port.field == "out").then(|| self.value.clone())
    }

    fn parameter_binding(&self) -> Option<ParameterBinding> {
        Some(ParameterBinding::get(self.name.clone()))
    }

    fn save(&self) -> serde_json::Value {
        json!({ "name": self.name })
    }
}

pub struct GetParamNodeFactory;

impl NodeFactory for GetParamNodeFactory {
    fn type_name(&self) -> &str {
        "param.get"
    }

    fn create(&self, payload: &serde_json::Value) -> Result<Box<dyn Node>, NodeError> {
        let config: ParamConfig = parse_config(payload)?;
        Ok(Box::new(GetParamNode::new(config.name)))
    }

    fn info(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            description: "Read a graph parameter by name".to_string(),
            category: "param".to_string(),
        }
    }
}

/// Writes its input to a named parameter each pass.
pub struct SetParamNode {
    name: String,
    value: Value,
}

impl SetParamNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Value::Null,
        }
    }
}

impl Node for SetParamNode {
    fn type_name(&self) -> &str {
        "param.set"
    }

    fn layout(&self) -> NodeLayout {
        NodeLayout::new().input(PortDescriptor::input("in", ValueKind::Any))
    }

    fn pull_input(&mut self, port: &PortRef, values: Vec<Value>) -> Result<(), NodeError> {
        if port.field == "in" {
            if let Some(value) = values.into_iter().next() {
                self.value = value;
            }
        }
        Ok(())
    }

    fn process(&mut self, ctx: &mut ProcessContext) -> Result<(), NodeError> {
        ctx.set_parameter(self.name.clone(), self.value.clone());
        Ok(())
    }

    fn push_output(&self, _port: &PortRef) -> Option<Value> {
        None
    }

    fn parameter_binding(&self) -> Option<ParameterBinding> {
        Some(ParameterBinding::set(self.name.clone()))
    }

    fn save(&self) -> serde_json::Value {
        json!({ "name": self.name })
    }
}

pub struct SetParamNodeFactory;

impl NodeFactory for SetParamNodeFactory {
    fn type_name(&self) -> &str {
        "param.set"
    }

    fn create(&self, payload: &serde_json::Value) -> Result<Box<dyn Node>, NodeError> {
        let config: ParamConfig = parse_config(payload)?;
        Ok(Box::new(SetParamNode::new(config.name)))
    }

    fn info(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            description: "Write a graph parameter by name".to_string(),
            category: "param".to_string(),
        }
    }
}
