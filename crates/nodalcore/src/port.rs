//! Live ports and the per-node, per-direction port containers.

use crate::edge::EdgeId;
use crate::node::{Direction, PortDescriptor, PortRef};

/// A connection point on a node: its descriptor plus the ordered list of
/// edges currently attached. Ports are views rebuilt from the node's
/// declaration (and, for dynamic fields, from the edge set); they are never
/// persisted themselves.
#[derive(Debug, Clone)]
pub struct Port {
    descriptor: PortDescriptor,
    edges: Vec<EdgeId>,
}

impl Port {
    pub fn new(descriptor: PortDescriptor) -> Self {
        Self {
            descriptor,
            edges: Vec::new(),
        }
    }

    pub fn descriptor(&self) -> &PortDescriptor {
        &self.descriptor
    }

    pub fn field(&self) -> &str {
        &self.descriptor.field
    }

    pub fn ident(&self) -> Option<&str> {
        self.descriptor.ident.as_deref()
    }

    pub fn reference(&self) -> PortRef {
        PortRef {
            field: self.descriptor.field.clone(),
            ident: self.descriptor.ident.clone(),
        }
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn has_edges(&self) -> bool {
        !self.edges.is_empty()
    }

    /// Attach an edge; adding one that is already present is a no-op.
    pub fn add_edge(&mut self, edge: EdgeId) {
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    pub fn remove_edge(&mut self, edge: EdgeId) {
        self.edges.retain(|e| *e != edge);
    }

    pub fn matches(&self, field: &str, ident: Option<&str>) -> bool {
        self.descriptor.field == field && self.descriptor.ident.as_deref() == ident
    }
}

/// Ordered collection of one node's ports for a single direction.
#[derive(Debug, Clone)]
pub struct PortContainer {
    direction: Direction,
    ports: Vec<Port>,
}

impl PortContainer {
    pub fn new(direction: Direction, descriptors: impl IntoIterator<Item = PortDescriptor>) -> Self {
        Self {
            direction,
            ports: descriptors.into_iter().map(Port::new).collect(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn iter(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Port> {
        self.ports.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn get(&self, field: &str, ident: Option<&str>) -> Option<&Port> {
        self.ports.iter().find(|p| p.matches(field, ident))
    }

    pub fn get_mut(&mut self, field: &str, ident: Option<&str>) -> Option<&mut Port> {
        self.ports.iter_mut().find(|p| p.matches(field, ident))
    }

    pub fn field_ports<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Port> + 'a {
        self.ports.iter().filter(move |p| p.field() == field)
    }

    pub fn push(&mut self, port: Port) {
        self.ports.push(port);
    }

    /// Replace all ports of `field` with `ports`, keeping the field's span
    /// at its current position so sibling fields stay stable.
    pub fn replace_field_ports(&mut self, field: &str, ports: Vec<Port>) {
        let at = self
            .ports
            .iter()
            .position(|p| p.field() == field)
            .unwrap_or(self.ports.len());
        self.ports.retain(|p| p.field() != field);
        let at = at.min(self.ports.len());
        for (offset, port) in ports.into_iter().enumerate() {
            self.ports.insert(at + offset, port);
        }
    }
}
