use nodalcore::{
    Node, NodeError, NodeLayout, PortDescriptor, PortRef, ProcessContext, Value, ValueKind,
};
use nodalruntime::{NodeFactory, NodeTypeInfo};

/// Untyped passthrough, useful for tidying long connections.
#[derive(Default)]
pub struct RelayNode {
    value: Value,
}

impl Node for RelayNode {
    fn type_name(&self) -> &str {
        "flow.relay"
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
        Ok(())
    }

    fn push_output(&self, port: &PortRef) -> Option<Value> {
        (port.field == "out").then(|| self.value.clone())
    }
}

pub struct RelayNodeFactory;

impl NodeFactory for RelayNodeFactory {
    fn type_name(&self) -> &str {
        "flow.relay"
    }

    fn create(&self, _payload: &serde_json::Value) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(RelayNode::default()))
    }

    fn info(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            description: "Pass the input through unchanged".to_string(),
            category: "flow".to_string(),
        }
    }
}
