//! Minimal node implementations for exercising the core crate without the
//! standard library crate.

#![allow(dead_code)]

use nodalcore::{
    EdgeSummary, Node, NodeError, NodeLayout, ParameterBinding, PortDescriptor, PortRef,
    ProcessContext, Value, ValueKind,
};
use std::collections::BTreeMap;

/// Emits a fixed value on `out`.
pub struct ConstNode {
    kind: ValueKind,
    value: Value,
}

impl ConstNode {
    pub fn int(value: i64) -> Self {
        Self {
            kind: ValueKind::Int,
            value: Value::Int(value),
        }
    }

    pub fn float(value: f64) -> Self {
        Self {
            kind: ValueKind::Float,
            value: Value::Float(value),
        }
    }

    pub fn string(value: &str) -> Self {
        Self {
            kind: ValueKind::String,
            value: Value::String(value.to_string()),
        }
    }
}

impl Node for ConstNode {
    fn type_name(&self) -> &str {
        "test.const"
    }

    fn layout(&self) -> NodeLayout {
        NodeLayout::new().output(PortDescriptor::output("out", self.kind))
    }

    fn process(&mut self, _ctx: &mut ProcessContext) -> Result<(), NodeError> {
        Ok(())
    }

    fn push_output(&self, port: &PortRef) -> Option<Value> {
        (port.field == "out").then(|| self.value.clone())
    }
}

/// Stores whatever arrives on `in` and republishes it on `out`.
pub struct CaptureNode {
    kind: ValueKind,
    seen: Value,
}

impl CaptureNode {
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            seen: Value::Null,
        }
    }

    pub fn any() -> Self {
        Self::new(ValueKind::Any)
    }
}

impl Node for CaptureNode {
    fn type_name(&self) -> &str {
        "test.capture"
    }

    fn layout(&self) -> NodeLayout {
        NodeLayout::new()
            .input(PortDescriptor::input("in", self.kind))
            .output(PortDescriptor::output("out", self.kind))
    }

    fn pull_input(&mut self, port: &PortRef, values: Vec<Value>) -> Result<(), NodeError> {
        if port.field == "in" {
            if let Some(value) = values.into_iter().next() {
                self.seen = value;
            }
        }
        Ok(())
    }

    fn process(&mut self, _ctx: &mut ProcessContext) -> Result<(), NodeError> {
        Ok(())
    }

    fn push_output(&self, port: &PortRef) -> Option<Value> {
        (port.field == "out").then(|| self.seen.clone())
    }
}

/// Always reports `can_process() == false`.
pub struct DisabledNode;

impl Node for DisabledNode {
    fn type_name(&self) -> &str {
        "test.disabled"
    }

    fn layout(&self) -> NodeLayout {
        NodeLayout::new().output(PortDescriptor::output("out", ValueKind::Int))
    }

    fn can_process(&self) -> bool {
        false
    }

    fn process(&mut self, _ctx: &mut ProcessContext) -> Result<(), NodeError> {
        Ok(())
    }

    fn push_output(&self, port: &PortRef) -> Option<Value> {
        (port.field == "out").then_some(Value::Int(0))
    }
}

/// Declares a parameter binding and nothing else; used for ordering tests.
pub struct ParamStubNode {
    binding: ParameterBinding,
}

impl ParamStubNode {
    pub fn getter(name: &str) -> Self {
        Self {
            binding: ParameterBinding::get(name),
        }
    }

    pub fn setter(name: &str) -> Self {
        Self {
            binding: ParameterBinding::set(name),
        }
    }
}

impl Node for ParamStubNode {
    fn type_name(&self) -> &str {
        "test.param"
    }

    fn layout(&self) -> NodeLayout {
        NodeLayout::new()
    }

    fn process(&mut self, _ctx: &mut ProcessContext) -> Result<(), NodeError> {
        Ok(())
    }

    fn push_output(&self, _port: &PortRef) -> Option<Value> {
        None
    }

    fn parameter_binding(&self) -> Option<ParameterBinding> {
        Some(self.binding.clone())
    }
}

/// Dynamic `items` field: one port per connected edge plus a trailing empty
/// slot, mirroring the collector pattern.
#[derive(Default)]
pub struct GrowNode {
    incoming: BTreeMap<usize, Value>,
    result: Vec<Value>,
}

impl Node for GrowNode {
    fn type_name(&self) -> &str {
        "test.grow"
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
        descriptors
            .push(PortDescriptor::input("items", ValueKind::Any).with_ident(next.to_string()));
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
        self.incoming.clear();
        Ok(())
    }

    fn push_output(&self, port: &PortRef) -> Option<Value> {
        (port.field == "out").then(|| Value::List(self.result.clone()))
    }
}
