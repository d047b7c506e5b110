//! Dynamic-port collector: the `items` field grows one input port per
//! connected edge plus a single trailing empty port, so there is always a
//! free slot to wire into.

use nodalcore::{
    EdgeSummary, Node, NodeError, NodeLayout, PortDescriptor, PortRef, ProcessContext, Value,
    ValueKind,
};
use nodalruntime::{NodeFactory, NodeTypeInfo};
use std::collections::BTreeMap;

#[derive(Default)]
pub struct CollectNode {
    incoming: BTreeMap<usize, Value>,
    result: Vec<Value>,
}

impl Node for CollectNode {
    fn type_name(&self) -> &str {
        "list.collect"
    }

    fn layout(&self) -> NodeLayout {
        NodeLayout::new()
            .input(PortDescriptor::input("items", ValueKind::Any).with_ident("0"))
            .dynamic("items")
            .output(PortDescriptor::output("out", ValueKind::List))
    }

    fn dynamic_ports(&self, field: &str, edges: &[EdgeSummary]) -> Option<Vec<PortDescriptor>> {
        if field != "items" {
            return None;
        }
        let mut slots: Vec<usize> = edges
            .iter()
            .filter_map(|e| e.ident.as_deref().and_then(|s| s.parse().ok()))
            .collect();
        slots.sort_unstable();
        slots.dedup();
        let next = slots.last().map_or(0, |n| n + 1);
        let mut descriptors: Vec<PortDescriptor> = slots
            .into_iter()
            .map(|slot| PortDescriptor::input("items", ValueKind::Any).with_ident(slot.to_string()))
            .collect();
        descriptors.push(PortDescriptor::input("items", ValueKind::Any).with_ident(next.to_string()));
        Some(descriptors)
    }

    fn pull_input(&mut self, port: &PortRef, values: Vec<Value>) -> Result<(), NodeError> {
        let Some(slot) = port.ident.as_deref().and_then(|s| s.parse().ok()) else {
            return Ok(());
        };
        if let Some(value) = values.into_iter().next() {
            self.incoming.insert(slot, value);
        }
        Ok(())
    }

    fn process(&mut self, _ctx: &mut ProcessContext) -> Result<(), NodeError> {
        self.result = self.incoming.values().cloned().collect();
        // Slots are repopulated by the next pass's pulls
        self.incoming.clear();
        Ok(())
    }

    fn push_output(&self, port: &PortRef) -> Option<Value> {
        (port.field == "out").then(|| Value::List(self.result.clone()))
    }
}

pub struct CollectNodeFactory;

impl NodeFactory for CollectNodeFactory {
    fn type_name(&self) -> &str {
        "list.collect"
    }

    fn create(&self, _payload: &serde_json::Value) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(CollectNode::default()))
    }

    fn info(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            description: "Gather connected values into a list".to_string(),
            category: "list".to_string(),
        }
    }
}
