//! Graph ownership, the mutation API, and data movement along edges.

use crate::adapter::TypeAdapters;
use crate::edge::{Edge, EdgeId, EdgeSummary, PortAddress};
use crate::error::{GraphError, NodeError};
use crate::events::{EventBus, GraphEvent};
use crate::node::{Direction, Node, NodeId, NodeLayout, PortRef, ProcessContext};
use crate::ordering::{self, OrderingStrategy, INVALID_COMPUTE_ORDER};
use crate::params::{ParameterRole, ParameterStore};
use crate::port::{Port, PortContainer};
use crate::value::Value;
use chrono::Utc;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Graph-side wrapper around one node: the boxed implementation, its live
/// port containers, the cached rank, and the last recorded failure.
///
/// The node box is an `Option` so the parallel backend can check it out for
/// the duration of one task; every other code path sees `Some`.
pub struct NodeHandle {
    type_name: String,
    node: Option<Box<dyn Node>>,
    layout: NodeLayout,
    inputs: PortContainer,
    outputs: PortContainer,
    compute_order: i32,
    last_error: Option<String>,
}

impl NodeHandle {
    fn new(node: Box<dyn Node>) -> Self {
        let layout = node.layout();
        let inputs = PortContainer::new(Direction::Input, layout.inputs.iter().cloned());
        let outputs = PortContainer::new(Direction::Output, layout.outputs.iter().cloned());
        Self {
            type_name: node.type_name().to_string(),
            node: Some(node),
            layout,
            inputs,
            outputs,
            compute_order: INVALID_COMPUTE_ORDER,
            last_error: None,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn node(&self) -> Option<&dyn Node> {
        self.node.as_deref()
    }

    pub fn node_mut(&mut self) -> Option<&mut (dyn Node + 'static)> {
        self.node.as_deref_mut()
    }

    pub fn layout(&self) -> &NodeLayout {
        &self.layout
    }

    pub fn inputs(&self) -> &PortContainer {
        &self.inputs
    }

    pub fn outputs(&self) -> &PortContainer {
        &self.outputs
    }

    pub fn compute_order(&self) -> i32 {
        self.compute_order
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn can_process(&self) -> bool {
        self.node.as_deref().is_some_and(Node::can_process)
    }

    fn container(&self, direction: Direction) -> &PortContainer {
        match direction {
            Direction::Input => &self.inputs,
            Direction::Output => &self.outputs,
        }
    }

    fn container_mut(&mut self, direction: Direction) -> &mut PortContainer {
        match direction {
            Direction::Input => &mut self.inputs,
            Direction::Output => &mut self.outputs,
        }
    }
}

/// A directed graph of typed nodes joined by edges, with a cached compute
/// order and a shared parameter store.
///
/// All mutation goes through [`Graph::add_node`], [`Graph::remove_node`],
/// [`Graph::connect`] and [`Graph::disconnect`]; each invalidates the
/// cached ordering and emits a change event.
pub struct Graph {
    name: String,
    nodes: IndexMap<NodeId, NodeHandle>,
    edges: IndexMap<EdgeId, Edge>,
    params: ParameterStore,
    adapters: Arc<TypeAdapters>,
    events: EventBus,
    strategy: OrderingStrategy,
    order_dirty: bool,
}

impl Graph {
    pub fn new(name: impl Into<String>, adapters: Arc<TypeAdapters>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            params: ParameterStore::new(),
            adapters,
            events: EventBus::default(),
            strategy: OrderingStrategy::default(),
            order_dirty: true,
        }
    }

    pub fn with_strategy(mut self, strategy: OrderingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn strategy(&self) -> OrderingStrategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: OrderingStrategy) {
        self.strategy = strategy;
        self.order_dirty = true;
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    pub fn adapters(&self) -> &Arc<TypeAdapters> {
        &self.adapters
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<GraphEvent> {
        self.events.subscribe()
    }

    /// The graph's event bus; processors emit run progress through it.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // --- lookups -----------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&NodeHandle> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeHandle> {
        self.nodes.get_mut(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeHandle)> {
        self.nodes.iter().map(|(id, handle)| (*id, handle))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn port(&self, address: &PortAddress, direction: Direction) -> Option<&Port> {
        self.nodes
            .get(&address.node)?
            .container(direction)
            .get(&address.field, address.ident.as_deref())
    }

    /// Directly connected upstream nodes, deduplicated, in port order.
    /// Snapshot semantics: recompute after any mutation.
    pub fn input_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbor_nodes(id, Direction::Input)
    }

    /// Directly connected downstream nodes, deduplicated, in port order.
    pub fn output_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbor_nodes(id, Direction::Output)
    }

    fn neighbor_nodes(&self, id: NodeId, direction: Direction) -> Vec<NodeId> {
        let Some(handle) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for port in handle.container(direction).iter() {
            for edge_id in port.edges() {
                let Some(edge) = self.edges.get(edge_id) else {
                    continue;
                };
                let neighbor = match direction {
                    Direction::Input => edge.from.node,
                    Direction::Output => edge.to.node,
                };
                if seen.insert(neighbor) {
                    out.push(neighbor);
                }
            }
        }
        out
    }

    // --- node mutation -----------------------------------------------------

    pub fn add_node(&mut self, node: Box<dyn Node>) -> NodeId {
        let id = Uuid::new_v4();
        self.insert_node(id, node);
        id
    }

    /// Register a node under a caller-chosen GUID; used when restoring a
    /// serialized graph. Rejected if the GUID is already taken.
    pub fn add_node_with_id(&mut self, id: NodeId, node: Box<dyn Node>) -> Result<NodeId, GraphError> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.insert_node(id, node);
        Ok(id)
    }

    fn insert_node(&mut self, id: NodeId, mut node: Box<dyn Node>) {
        node.init(&self.params);
        let handle = NodeHandle::new(node);
        let node_type = handle.type_name().to_string();
        self.nodes.insert(id, handle);
        self.order_dirty = true;
        self.events.emit(GraphEvent::NodeAdded {
            node: id,
            node_type,
            timestamp: Utc::now(),
        });
    }

    /// Remove a node, disconnecting every touching edge first so no dangling
    /// references survive.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::NodeNotFound(id));
        }
        let touching: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|e| e.involves_node(id))
            .map(|e| e.id)
            .collect();
        for edge_id in touching {
            let _ = self.disconnect(edge_id);
        }
        self.nodes.shift_remove(&id);
        self.order_dirty = true;
        self.events.emit(GraphEvent::NodeRemoved {
            node: id,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Content-change signal for UI layers; the graph itself does not
    /// interpret it.
    pub fn notify_node_changed(&self, id: NodeId) {
        self.events.emit(GraphEvent::NodeChanged {
            node: id,
            timestamp: Utc::now(),
        });
    }

    // --- edge mutation -----------------------------------------------------

    /// Connect an output port to an input port, auto-disconnecting occupied
    /// single-edge endpoints.
    pub fn connect(&mut self, from: PortAddress, to: PortAddress) -> Result<EdgeId, GraphError> {
        self.connect_with(from, to, true)
    }

    pub fn connect_with(
        &mut self,
        from: PortAddress,
        to: PortAddress,
        auto_disconnect: bool,
    ) -> Result<EdgeId, GraphError> {
        self.connect_with_id(Uuid::new_v4(), from, to, auto_disconnect)
    }

    pub fn connect_with_id(
        &mut self,
        id: EdgeId,
        from: PortAddress,
        to: PortAddress,
        auto_disconnect: bool,
    ) -> Result<EdgeId, GraphError> {
        match self.try_connect(id, &from, &to, auto_disconnect) {
            Ok(edge_id) => Ok(edge_id),
            Err(err) => {
                // A provisional dynamic port may have been grown before the
                // validation that failed; reconciling drops it again.
                self.reconcile_field(from.node, &from.field);
                self.reconcile_field(to.node, &to.field);
                Err(err)
            }
        }
    }

    fn try_connect(
        &mut self,
        id: EdgeId,
        from: &PortAddress,
        to: &PortAddress,
        auto_disconnect: bool,
    ) -> Result<EdgeId, GraphError> {
        if self.edges.contains_key(&id) {
            return Err(GraphError::DuplicateEdge(id));
        }
        if from == to {
            return Err(GraphError::SelfConnection);
        }
        if !self.nodes.contains_key(&from.node) {
            return Err(GraphError::NodeNotFound(from.node));
        }
        if !self.nodes.contains_key(&to.node) {
            return Err(GraphError::NodeNotFound(to.node));
        }
        if self.edges.values().any(|e| e.from == *from && e.to == *to) {
            return Err(GraphError::AlreadyConnected);
        }

        self.ensure_port(from, Direction::Output)?;
        self.ensure_port(to, Direction::Input)?;

        let from_port = self
            .port(from, Direction::Output)
            .ok_or_else(|| GraphError::PortNotFound {
                node: from.node,
                port: from.port_name(),
            })?;
        let to_port = self
            .port(to, Direction::Input)
            .ok_or_else(|| GraphError::PortNotFound {
                node: to.node,
                port: to.port_name(),
            })?;

        let from_kind = from_port.descriptor().kind;
        let to_kind = to_port.descriptor().kind;
        if !self.adapters.compatible(from_kind, to_kind) {
            return Err(GraphError::IncompatibleTypes {
                from: from_kind,
                to: to_kind,
            });
        }

        // At most one edge survives on a port that rejects multiples
        let mut stale: Vec<EdgeId> = Vec::new();
        if !from_port.descriptor().accept_multiple_edges && from_port.has_edges() {
            if !auto_disconnect {
                return Err(GraphError::PortOccupied {
                    port: from.port_name(),
                });
            }
            stale.extend_from_slice(from_port.edges());
        }
        if !to_port.descriptor().accept_multiple_edges && to_port.has_edges() {
            if !auto_disconnect {
                return Err(GraphError::PortOccupied {
                    port: to.port_name(),
                });
            }
            stale.extend_from_slice(to_port.edges());
        }
        for edge_id in stale {
            let _ = self.disconnect(edge_id);
        }

        // Disconnecting may have reconciled a dynamic field underneath us
        self.ensure_port(from, Direction::Output)?;
        self.ensure_port(to, Direction::Input)?;

        let edge = Edge::with_id(id, from.clone(), to.clone());
        self.edges.insert(id, edge);
        if let Some(port) = self.port_mut(from, Direction::Output) {
            port.add_edge(id);
        }
        if let Some(port) = self.port_mut(to, Direction::Input) {
            port.add_edge(id);
        }
        self.order_dirty = true;
        self.events.emit(GraphEvent::EdgeConnected {
            edge: id,
            from: from.clone(),
            to: to.clone(),
            timestamp: Utc::now(),
        });
        self.reconcile_field(from.node, &from.field);
        self.reconcile_field(to.node, &to.field);
        Ok(id)
    }

    /// Remove an edge. Both endpoint nodes are notified (the change event
    /// fires after removal) and dynamic fields re-reconciled.
    pub fn disconnect(&mut self, id: EdgeId) -> Result<(), GraphError> {
        let edge = self
            .remove_edge_internal(id)
            .ok_or(GraphError::EdgeNotFound(id))?;
        self.reconcile_field(edge.from.node, &edge.from.field);
        self.reconcile_field(edge.to.node, &edge.to.field);
        Ok(())
    }

    fn remove_edge_internal(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.shift_remove(&id)?;
        if let Some(port) = self.port_mut(&edge.from, Direction::Output) {
            port.remove_edge(id);
        }
        if let Some(port) = self.port_mut(&edge.to, Direction::Input) {
            port.remove_edge(id);
        }
        self.order_dirty = true;
        self.events.emit(GraphEvent::EdgeDisconnected {
            edge: id,
            from: edge.from.clone(),
            to: edge.to.clone(),
            timestamp: Utc::now(),
        });
        Some(edge)
    }

    fn port_mut(&mut self, address: &PortAddress, direction: Direction) -> Option<&mut Port> {
        self.nodes
            .get_mut(&address.node)?
            .container_mut(direction)
            .get_mut(&address.field, address.ident.as_deref())
    }

    /// Make sure the addressed port exists, growing a provisional port on a
    /// dynamic field when the edge about to attach would create it anyway.
    fn ensure_port(&mut self, address: &PortAddress, direction: Direction) -> Result<(), GraphError> {
        let not_found = || GraphError::PortNotFound {
            node: address.node,
            port: address.port_name(),
        };
        let handle = self
            .nodes
            .get(&address.node)
            .ok_or(GraphError::NodeNotFound(address.node))?;
        if handle
            .container(direction)
            .get(&address.field, address.ident.as_deref())
            .is_some()
        {
            return Ok(());
        }
        if !handle.layout.is_dynamic(&address.field) {
            return Err(not_found());
        }
        let mut summaries = self.field_edge_summaries(address.node, &address.field);
        summaries.push(EdgeSummary {
            id: Uuid::nil(),
            ident: address.ident.clone(),
        });
        let node = handle.node().ok_or_else(not_found)?;
        let descriptors = node
            .dynamic_ports(&address.field, &summaries)
            .ok_or_else(not_found)?;
        let descriptor = descriptors
            .into_iter()
            .find(|d| {
                d.field == address.field && d.ident == address.ident && d.direction == direction
            })
            .ok_or_else(not_found)?;
        let handle = self
            .nodes
            .get_mut(&address.node)
            .ok_or(GraphError::NodeNotFound(address.node))?;
        handle.container_mut(direction).push(Port::new(descriptor));
        Ok(())
    }

    fn field_edge_summaries(&self, node: NodeId, field: &str) -> Vec<EdgeSummary> {
        let Some(handle) = self.nodes.get(&node) else {
            return Vec::new();
        };
        let mut summaries = Vec::new();
        for container in [&handle.inputs, &handle.outputs] {
            for port in container.field_ports(field) {
                for edge_id in port.edges() {
                    summaries.push(EdgeSummary {
                        id: *edge_id,
                        ident: port.ident().map(str::to_string),
                    });
                }
            }
        }
        summaries
    }

    /// Re-derive the port list of one dynamic field from its current edges:
    /// ports whose identifier disappeared are removed (their edges
    /// disconnected first), newly described ports are added, descriptor
    /// order is preserved. Removals change the edge set, so iterate until
    /// stable.
    fn reconcile_field(&mut self, node: NodeId, field: &str) {
        let mut changed = false;
        for _ in 0..8 {
            let Some(handle) = self.nodes.get(&node) else {
                break;
            };
            if !handle.layout.is_dynamic(field) {
                break;
            }
            let Some(node_impl) = handle.node() else {
                break;
            };
            let summaries = self.field_edge_summaries(node, field);
            let Some(descriptors) = node_impl.dynamic_ports(field, &summaries) else {
                break;
            };

            let wanted: HashSet<(Direction, Option<String>)> = descriptors
                .iter()
                .map(|d| (d.direction, d.ident.clone()))
                .collect();
            let mut stale_edges: Vec<EdgeId> = Vec::new();
            for (direction, container) in
                [(Direction::Input, &handle.inputs), (Direction::Output, &handle.outputs)]
            {
                for port in container.field_ports(field) {
                    if !wanted.contains(&(direction, port.ident().map(str::to_string))) {
                        stale_edges.extend_from_slice(port.edges());
                    }
                }
            }
            if !stale_edges.is_empty() {
                for edge_id in stale_edges {
                    self.remove_edge_internal(edge_id);
                }
                changed = true;
                continue;
            }

            // Rebuild both spans in descriptor order, carrying surviving
            // ports (and their edge lists) over by identifier.
            let mut new_inputs: Vec<Port> = Vec::new();
            let mut new_outputs: Vec<Port> = Vec::new();
            for descriptor in &descriptors {
                let container = handle.container(descriptor.direction);
                let port = container
                    .get(&descriptor.field, descriptor.ident.as_deref())
                    .cloned()
                    .unwrap_or_else(|| Port::new(descriptor.clone()));
                match descriptor.direction {
                    Direction::Input => new_inputs.push(port),
                    Direction::Output => new_outputs.push(port),
                }
            }
            let same = |container: &PortContainer, replacement: &[Port]| {
                let current: Vec<Option<String>> = container
                    .field_ports(field)
                    .map(|p| p.ident().map(str::to_string))
                    .collect();
                let wanted: Vec<Option<String>> = replacement
                    .iter()
                    .map(|p| p.ident().map(str::to_string))
                    .collect();
                current == wanted
            };
            if same(&handle.inputs, &new_inputs) && same(&handle.outputs, &new_outputs) {
                break;
            }
            let Some(handle) = self.nodes.get_mut(&node) else {
                break;
            };
            handle.inputs.replace_field_ports(field, new_inputs);
            handle.outputs.replace_field_ports(field, new_outputs);
            changed = true;
        }
        if changed {
            self.notify_node_changed(node);
        }
    }

    /// Post-deserialization consistency pass: drop every edge whose endpoint
    /// node or port cannot be resolved. Returns how many were dropped.
    pub fn sweep_broken_elements(&mut self) -> usize {
        let broken: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|edge| {
                self.port(&edge.from, Direction::Output).is_none()
                    || self.port(&edge.to, Direction::Input).is_none()
            })
            .map(|edge| edge.id)
            .collect();
        for edge_id in &broken {
            tracing::warn!(edge = %edge_id, "dropping edge with unresolvable endpoint");
            self.remove_edge_internal(*edge_id);
        }
        // Port edge lists must only reference live edges
        let edges = &self.edges;
        for handle in self.nodes.values_mut() {
            for port in handle.inputs.iter_mut().chain(handle.outputs.iter_mut()) {
                let dead: Vec<EdgeId> = port
                    .edges()
                    .iter()
                    .copied()
                    .filter(|id| !edges.contains_key(id))
                    .collect();
                for id in dead {
                    port.remove_edge(id);
                }
            }
        }
        broken.len()
    }

    // --- ordering ----------------------------------------------------------

    /// All `(producer, consumer)` pairs the ordering pass must respect:
    /// one per data edge, plus an implicit pair from every parameter setter
    /// to each getter of the same name.
    pub fn dependency_edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut seen = HashSet::new();
        let mut pairs = Vec::new();
        for edge in self.edges.values() {
            let pair = (edge.from.node, edge.to.node);
            if seen.insert(pair) {
                pairs.push(pair);
            }
        }
        let mut setters: HashMap<String, Vec<NodeId>> = HashMap::new();
        let mut getters: Vec<(String, NodeId)> = Vec::new();
        for (id, handle) in self.nodes.iter() {
            let Some(binding) = handle.node().and_then(|n| n.parameter_binding()) else {
                continue;
            };
            match binding.role {
                ParameterRole::Set => setters.entry(binding.name).or_default().push(*id),
                ParameterRole::Get => getters.push((binding.name, *id)),
            }
        }
        for (name, getter) in getters {
            for setter in setters.get(&name).into_iter().flatten() {
                let pair = (*setter, getter);
                if pair.0 != pair.1 && seen.insert(pair) {
                    pairs.push(pair);
                }
            }
        }
        pairs
    }

    pub fn node_can_process(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(NodeHandle::can_process)
    }

    /// Recompute and cache every node's rank. Idempotent while the graph is
    /// unchanged.
    pub fn update_compute_order(&mut self) {
        let ranks = ordering::compute(self);
        for (id, handle) in self.nodes.iter_mut() {
            handle.compute_order = ranks.get(id).copied().unwrap_or(INVALID_COMPUTE_ORDER);
        }
        self.order_dirty = false;
    }

    pub fn compute_order(&self, id: NodeId) -> Option<i32> {
        self.nodes.get(&id).map(|h| h.compute_order)
    }

    /// Whether a mutation happened since the last `update_compute_order`.
    pub fn order_dirty(&self) -> bool {
        self.order_dirty
    }

    /// Executable nodes (rank >= 0) sorted ascending by rank.
    pub fn executable_order(&self) -> Vec<NodeId> {
        let mut ranked: Vec<(i32, NodeId)> = self
            .nodes
            .iter()
            .filter(|(_, h)| h.compute_order >= 0)
            .map(|(id, h)| (h.compute_order, *id))
            .collect();
        ranked.sort_by_key(|(rank, _)| *rank);
        ranked.into_iter().map(|(_, id)| id).collect()
    }

    // --- data movement -----------------------------------------------------

    /// Reset every pass-through buffer; run once at the start of a pass.
    pub fn reset_buffers(&mut self) {
        for edge in self.edges.values_mut() {
            edge.buffer = Value::Null;
        }
    }

    /// Gather each connected input port's edge values in order, converted to
    /// the port's declared kind. Unwritten (`Null`) buffers and edgeless
    /// ports are skipped so the node field keeps its previous value.
    pub fn snapshot_inputs(&self, id: NodeId) -> Result<Vec<(PortRef, Vec<Value>)>, NodeError> {
        let handle = self
            .nodes
            .get(&id)
            .ok_or_else(|| NodeError::ExecutionFailed(format!("unknown node {id}")))?;
        let mut batches = Vec::new();
        for port in handle.inputs.iter() {
            if !port.has_edges() {
                continue;
            }
            let descriptor = port.descriptor();
            let mut values = Vec::with_capacity(port.edges().len());
            for edge_id in port.edges() {
                let Some(edge) = self.edges.get(edge_id) else {
                    continue;
                };
                if edge.buffer.is_null() {
                    continue;
                }
                let value = self
                    .adapters
                    .convert(&edge.buffer, descriptor.kind)
                    .ok_or_else(|| NodeError::InvalidInputType {
                        field: descriptor.field.clone(),
                        expected: descriptor.kind,
                        actual: edge.buffer.kind(),
                    })?;
                values.push(value);
            }
            if !values.is_empty() {
                batches.push((port.reference(), values));
            }
        }
        Ok(batches)
    }

    /// Pull incoming edge values into the node's fields.
    pub fn pull_inputs(&mut self, id: NodeId) -> Result<(), NodeError> {
        let batches = self.snapshot_inputs(id)?;
        let handle = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| NodeError::ExecutionFailed(format!("unknown node {id}")))?;
        let node = handle
            .node_mut()
            .ok_or_else(|| NodeError::ExecutionFailed("node is checked out".to_string()))?;
        for (port, values) in batches {
            node.pull_input(&port, values)?;
        }
        Ok(())
    }

    /// Run the node's state transition.
    pub fn process_node(&mut self, id: NodeId) -> Result<(), NodeError> {
        let params = self.params.clone();
        let handle = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| NodeError::ExecutionFailed(format!("unknown node {id}")))?;
        let node = handle
            .node_mut()
            .ok_or_else(|| NodeError::ExecutionFailed("node is checked out".to_string()))?;
        let mut ctx = ProcessContext::new(id, params);
        node.process(&mut ctx)
    }

    /// Copy produced output values onto every connected outgoing edge.
    pub fn push_outputs(&mut self, id: NodeId) {
        let Some(handle) = self.nodes.get(&id) else {
            return;
        };
        let Some(node) = handle.node() else {
            return;
        };
        let mut writes: Vec<(Vec<EdgeId>, Value)> = Vec::new();
        for port in handle.outputs.iter() {
            if !port.has_edges() {
                continue;
            }
            if let Some(value) = node.push_output(&port.reference()) {
                writes.push((port.edges().to_vec(), value));
            }
        }
        for (edge_ids, value) in writes {
            for edge_id in edge_ids {
                if let Some(edge) = self.edges.get_mut(&edge_id) {
                    edge.buffer = value.clone();
                }
            }
        }
    }

    /// Record or clear the user-visible failure message for one node.
    pub fn record_node_error(&mut self, id: NodeId, error: Option<String>) {
        if let Some(handle) = self.nodes.get_mut(&id) {
            handle.last_error = error;
        }
    }

    /// Read one output port's current value without touching edges.
    pub fn output_value(&self, id: NodeId, port: &PortRef) -> Option<Value> {
        self.nodes.get(&id)?.node()?.push_output(port)
    }

    /// Every declared output port's current value, in port order.
    pub fn node_outputs(&self, id: NodeId) -> Vec<(PortRef, Value)> {
        let Some(handle) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let Some(node) = handle.node() else {
            return Vec::new();
        };
        handle
            .outputs
            .iter()
            .filter_map(|port| {
                let reference = port.reference();
                node.push_output(&reference).map(|value| (reference, value))
            })
            .collect()
    }

    // --- parallel backend support -----------------------------------------

    /// Check a node implementation out of its handle for the duration of
    /// one worker task. Pair with [`Graph::restore_node`].
    pub fn take_node(&mut self, id: NodeId) -> Option<Box<dyn Node>> {
        self.nodes.get_mut(&id)?.node.take()
    }

    pub fn restore_node(&mut self, id: NodeId, node: Box<dyn Node>) {
        if let Some(handle) = self.nodes.get_mut(&id) {
            handle.node = Some(node);
        }
    }
}
