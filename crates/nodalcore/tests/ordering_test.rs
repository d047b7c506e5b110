mod common;

use common::{CaptureNode, ConstNode, DisabledNode, ParamStubNode};
use nodalcore::{
    Graph, NodeId, OrderingStrategy, PortAddress, TypeAdapters, ValueKind,
    INVALID_COMPUTE_ORDER, LOOP_COMPUTE_ORDER,
};
use std::collections::HashMap;
use std::sync::Arc;

fn empty_graph() -> Graph {
    Graph::new("ordering", Arc::new(TypeAdapters::standard()))
}

/// Diamond: a -> (b, c) -> d, plus a stray source e -> d.
fn diamond(graph: &mut Graph) -> (NodeId, NodeId, NodeId, NodeId, NodeId) {
    let a = graph.add_node(Box::new(ConstNode::int(1)));
    let b = graph.add_node(Box::new(CaptureNode::any()));
    let c = graph.add_node(Box::new(CaptureNode::any()));
    let d = graph.add_node(Box::new(common::GrowNode::default()));
    let e = graph.add_node(Box::new(ConstNode::int(9)));

    graph
        .connect(PortAddress::new(a, "out"), PortAddress::new(b, "in"))
        .unwrap();
    graph
        .connect(PortAddress::new(a, "out"), PortAddress::new(c, "in"))
        .unwrap();
    graph
        .connect(
            PortAddress::new(b, "out"),
            PortAddress::new(d, "items").with_ident("0"),
        )
        .unwrap();
    graph
        .connect(
            PortAddress::new(c, "out"),
            PortAddress::new(d, "items").with_ident("1"),
        )
        .unwrap();
    graph
        .connect(
            PortAddress::new(e, "out"),
            PortAddress::new(d, "items").with_ident("2"),
        )
        .unwrap();
    (a, b, c, d, e)
}

fn assert_valid_topological(graph: &Graph) {
    for edge in graph.edges() {
        let from = graph.compute_order(edge.from.node).unwrap();
        let to = graph.compute_order(edge.to.node).unwrap();
        if from >= 0 && to >= 0 {
            assert!(
                from < to,
                "edge violates ordering: rank {} -> rank {}",
                from,
                to
            );
        }
    }
}

#[test]
fn depth_first_order_is_valid_and_dense() {
    let mut graph = empty_graph();
    diamond(&mut graph);
    graph.update_compute_order();
    assert_valid_topological(&graph);

    let mut ranks: Vec<i32> = graph
        .nodes()
        .map(|(_, handle)| handle.compute_order())
        .collect();
    ranks.sort_unstable();
    assert_eq!(ranks, vec![0, 1, 2, 3, 4]);
}

#[test]
fn longest_path_order_is_valid() {
    let mut graph = empty_graph();
    graph.set_strategy(OrderingStrategy::LongestPath);
    let (a, b, c, d, e) = diamond(&mut graph);
    graph.update_compute_order();
    assert_valid_topological(&graph);

    // Ranks follow the longest dependency chain
    assert_eq!(graph.compute_order(a), Some(0));
    assert_eq!(graph.compute_order(e), Some(0));
    assert_eq!(graph.compute_order(b), Some(1));
    assert_eq!(graph.compute_order(c), Some(1));
    assert_eq!(graph.compute_order(d), Some(2));
}

#[test]
fn update_is_idempotent_without_mutation() {
    let mut graph = empty_graph();
    diamond(&mut graph);
    graph.update_compute_order();
    let first: HashMap<NodeId, i32> = graph
        .nodes()
        .map(|(id, handle)| (id, handle.compute_order()))
        .collect();
    graph.update_compute_order();
    let second: HashMap<NodeId, i32> = graph
        .nodes()
        .map(|(id, handle)| (id, handle.compute_order()))
        .collect();
    assert_eq!(first, second);
}

#[test]
fn two_cycle_gets_loop_sentinel_only_for_members() {
    let mut graph = empty_graph();
    let x = graph.add_node(Box::new(CaptureNode::any()));
    let y = graph.add_node(Box::new(CaptureNode::any()));
    let lone = graph.add_node(Box::new(ConstNode::int(5)));
    let sink = graph.add_node(Box::new(CaptureNode::new(ValueKind::Int)));

    graph
        .connect(PortAddress::new(x, "out"), PortAddress::new(y, "in"))
        .unwrap();
    graph
        .connect(PortAddress::new(y, "out"), PortAddress::new(x, "in"))
        .unwrap();
    graph
        .connect(PortAddress::new(lone, "out"), PortAddress::new(sink, "in"))
        .unwrap();

    graph.update_compute_order();
    assert_eq!(graph.compute_order(x), Some(LOOP_COMPUTE_ORDER));
    assert_eq!(graph.compute_order(y), Some(LOOP_COMPUTE_ORDER));
    assert!(graph.compute_order(lone).unwrap() >= 0);
    assert!(graph.compute_order(sink).unwrap() >= 0);

    let order = graph.executable_order();
    assert_eq!(order.len(), 2);
    assert!(!order.contains(&x));
    assert!(!order.contains(&y));
}

#[test]
fn self_loop_is_a_cycle() {
    let mut graph = empty_graph();
    let x = graph.add_node(Box::new(CaptureNode::any()));
    graph
        .connect(PortAddress::new(x, "out"), PortAddress::new(x, "in"))
        .unwrap();
    graph.update_compute_order();
    assert_eq!(graph.compute_order(x), Some(LOOP_COMPUTE_ORDER));
}

#[test]
fn disabled_node_is_excluded_without_consuming_a_rank() {
    let mut graph = empty_graph();
    let a = graph.add_node(Box::new(ConstNode::int(1)));
    let off = graph.add_node(Box::new(DisabledNode));
    let sink = graph.add_node(Box::new(CaptureNode::new(ValueKind::Int)));
    graph
        .connect(PortAddress::new(a, "out"), PortAddress::new(sink, "in"))
        .unwrap();

    graph.update_compute_order();
    assert_eq!(graph.compute_order(off), Some(INVALID_COMPUTE_ORDER));
    let mut ranks: Vec<i32> = graph
        .executable_order()
        .iter()
        .map(|id| graph.compute_order(*id).unwrap())
        .collect();
    ranks.sort_unstable();
    assert_eq!(ranks, vec![0, 1]);
}

#[test]
fn parameter_setters_order_before_getters() {
    let mut graph = empty_graph();
    // Insertion order deliberately puts the getter first
    let getter = graph.add_node(Box::new(ParamStubNode::getter("speed")));
    let setter = graph.add_node(Box::new(ParamStubNode::setter("speed")));
    let unrelated = graph.add_node(Box::new(ParamStubNode::setter("other")));

    graph.update_compute_order();
    let getter_rank = graph.compute_order(getter).unwrap();
    let setter_rank = graph.compute_order(setter).unwrap();
    assert!(
        setter_rank < getter_rank,
        "setter rank {} must precede getter rank {}",
        setter_rank,
        getter_rank
    );
    assert!(graph.compute_order(unrelated).unwrap() >= 0);
}

#[test]
fn mutation_marks_order_dirty() {
    let mut graph = empty_graph();
    let a = graph.add_node(Box::new(ConstNode::int(1)));
    graph.update_compute_order();
    assert!(!graph.order_dirty());
    graph.remove_node(a).unwrap();
    assert!(graph.order_dirty());
}
