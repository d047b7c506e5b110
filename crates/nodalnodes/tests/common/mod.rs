#![allow(dead_code)]

use nodalcore::{
    Node, NodeError, NodeLayout, PortDescriptor, PortRef, ProcessContext, Value, ValueKind,
};

/// A node whose `process` always fails; its `result` output keeps the
/// pre-run default of 0.
#[derive(Default)]
pub struct FailNode {
    input: i64,
    result: i64,
}

impl Node for FailNode {
    fn type_name(&self) -> &str {
        "test.fail"
    }

    fn layout(&self) -> NodeLayout {
        NodeLayout::new()
            .input(PortDescriptor::input("in", ValueKind::Int))
            .output(PortDescriptor::output("out", ValueKind::Int))
    }

    fn pull_input(&mut self, port: &PortRef, values: Vec<Value>) -> Result<(), NodeError> {
        if port.field == "in" {
            if let Some(value) = values.into_iter().next() {
                self.input = value.as_int().unwrap_or_default();
            }
        }
        Ok(())
    }

    fn process(&mut self, _ctx: &mut ProcessContext) -> Result<(), NodeError> {
        Err(NodeError::ExecutionFailed("deliberate failure".to_string()))
    }

    fn push_output(&self, port: &PortRef) -> Option<Value> {
        (port.field == "out").then(|| Value::Int(self.result))
    }
}
