//! Integer arithmetic nodes.

use nodalcore::{
    Node, NodeError, NodeLayout, PortDescriptor, PortRef, ProcessContext, Value, ValueKind,
};
use nodalruntime::{NodeFactory, NodeTypeInfo};

fn single_int(port: &PortRef, values: Vec<Value>) -> Result<i64, NodeError> {
    let value = values.into_iter().next().unwrap_or(Value::Null);
    value.as_int().ok_or(NodeError::InvalidInputType {
        field: port.field.clone(),
        expected: ValueKind::Int,
        actual: value.kind(),
    })
}

/// out = a + b
#[derive(Default)]
pub struct AddNode {
    a: i64,
    b: i64,
    result: i64,
}

impl Node for AddNode {
    fn type_name(&self) -> &str {
        "math.add"
    }

    fn layout(&self) -> NodeLayout {
        NodeLayout::new()
            .input(PortDescriptor::input("a", ValueKind::Int))
            .input(PortDescriptor::input("b", ValueKind::Int))
            .output(PortDescriptor::output("out", ValueKind::Int))
    }

    fn pull_input(&mut self, port: &PortRef, values: Vec<Value>) -> Result<(), NodeError> {
        match port.field.as_str() {
            "a" => self.a = single_int(port, values)?,
            "b" => self.b = single_int(port, values)?,
            _ => {}
        }
        Ok(())
    }

    fn process(&mut self, _ctx: &mut ProcessContext) -> Result<(), NodeError> {
        self.result = self
            .a
            .checked_add(self.b)
            .ok_or_else(|| NodeError::ExecutionFailed("integer overflow".to_string()))?;
        Ok(())
    }

    fn push_output(&self, port: &PortRef) -> Option<Value> {
        (port.field == "out").then(|| Value::Int(self.result))
    }
}

pub struct AddNodeFactory;

impl NodeFactory for AddNodeFactory {
    fn type_name(&self) -> &str {
        "math.add"
    }

    fn create(&self, _payload: &serde_json::Value) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(AddNode::default()))
    }

    fn info(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            description: "Add two integers".to_string(),
            category: "math".to_string(),
        }
    }
}

/// out = a - b
#[derive(Default)]
pub struct SubNode {
    a: i64,
    b: i64,
    result: i64,
}

impl Node for SubNode {
    fn type_name(&self) -> &str {
        "math.sub"
    }

    fn layout(&self) -> NodeLayout {
        NodeLayout::new()
            .input(PortDescriptor::input("a", ValueKind::Int))
            .input(PortDescriptor::input("b", ValueKind::Int))
            .output(PortDescriptor::output("out", ValueKind::Int))
    }

    fn pull_input(&mut self, port: &PortRef, values: Vec<Value>) -> Result<(), NodeError> {
        match port.field.as_str() {
            "a" => self.a = single_int(port, values)?,
            "b" => self.b = single_int(port, values)?,
            _ => {}
        }
        Ok(())
    }

    fn process(&mut self, _ctx: &mut ProcessContext) -> Result<(), NodeError> {
        self.result = self
            .a
            .checked_sub(self.b)
            .ok_or_else(|| NodeError::ExecutionFailed("integer overflow".to_string()))?;
        Ok(())
    }

    fn push_output(&self, port: &PortRef) -> Option<Value> {
        (port.field == "out").then(|| Value::Int(self.result))
    }
}

pub struct SubNodeFactory;

impl NodeFactory for SubNodeFactory {
    fn type_name(&self) -> &str {
        "math.sub"
    }

    fn create(&self, _payload: &serde_json::Value) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(SubNode::default()))
    }

    fn info(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            description: "Subtract two integers".to_string(),
            category: "math".to_string(),
        }
    }
}

/// out = a * b
#[derive(Default)]
pub struct MulNode {
    a: i64,
    b: i64,
    result: i64,
}

impl Node for MulNode {
    fn type_name(&self) -> &str {
        "math.mul"
    }

    fn layout(&self) -> NodeLayout {
        NodeLayout::new()
            .input(PortDescriptor::input("a", ValueKind::Int))
            .input(PortDescriptor::input("b", ValueKind::Int))
            .output(PortDescriptor::output("out", ValueKind::Int))
    }

    fn pull_input(&mut self, port: &PortRef, values: Vec<Value>) -> Result<(), NodeError> {
        match port.field.as_str() {
            "a" => self.a = single_int(port, values)?,
            "b" => self.b = single_int(port, values)?,
            _ => {}
        }
        Ok(())
    }

    fn process(&mut self, _ctx: &mut ProcessContext) -> Result<(), NodeError> {
        self.result = self
            .a
            .checked_mul(self.b)
            .ok_or_else(|| NodeError::ExecutionFailed("integer overflow".to_string()))?;
        Ok(())
    }

    fn push_output(&self, port: &PortRef) -> Option<Value> {
        (port.field == "out").then(|| Value::Int(self.result))
    }
}

pub struct MulNodeFactory;

impl NodeFactory for MulNodeFactory {
    fn type_name(&self) -> &str {
        "math.mul"
    }

    fn create(&self, _payload: &serde_json::Value) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(MulNode::default()))
    }

    fn info(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            description: "Multiply two integers".to_string(),
            category: "math".to_string(),
        }
    }
}

/// Sums every edge connected to its multi-edge input.
#[derive(Default)]
pub struct SumNode {
    values: Vec<i64>,
    result: i64,
}

impl Node for SumNode {
    fn type_name(&self) -> &str {
        "math.sum"
    }

    fn layout(&self) -> NodeLayout {
        NodeLayout::new()
            .input(PortDescriptor::input("values", ValueKind::Int).multi())
            .output(PortDescriptor::output("out", ValueKind::Int))
    }

    fn pull_input(&mut self, port: &PortRef, values: Vec<Value>) -> Result<(), NodeError> {
        if port.field != "values" {
            return Ok(());
        }
        self.values = values
            .iter()
            .map(|v| {
                v.as_int().ok_or(NodeError::InvalidInputType {
                    field: port.field.clone(),
                    expected: ValueKind::Int,
                    actual: v.kind(),
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    fn process(&mut self, _ctx: &mut ProcessContext) -> Result<(), NodeError> {
        self.result = self.values.iter().try_fold(0i64, |acc, v| {
            acc.checked_add(*v)
                .ok_or_else(|| NodeError::ExecutionFailed("integer overflow".to_string()))
        })?;
        Ok(())
    }

    fn push_output(&self, port: &PortRef) -> Option<Value> {
        (port.field == "out").then(|| Value::Int(self.result))
    }
}

pub struct SumNodeFactory;

impl NodeFactory for SumNodeFactory {
    fn type_name(&self) -> &str {
        "math.sum"
    }

    fn create(&self, _payload: &serde_json::Value) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(SumNode::default()))
    }

    fn info(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            description: "Sum all connected integer inputs".to_string(),
            category: "math".to_string(),
        }
    }
}
