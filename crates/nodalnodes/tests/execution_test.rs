mod common;

use common::FailNode;
use nodalcore::{
    Graph, PortAddress, PortRef, ProcessError, TypeAdapters, Value, LOOP_COMPUTE_ORDER,
};
use nodalnodes::{AddNode, FloatNode, GetParamNode, IntNode, LogNode, RelayNode, SetParamNode, SumNode};
use nodalruntime::{GraphProcessor, ProcessorConfig, ProcessorState};
use std::sync::Arc;

fn empty_graph() -> Graph {
    Graph::new("test", Arc::new(TypeAdapters::standard()))
}

#[test]
fn add_graph_produces_five() {
    let mut graph = empty_graph();
    let a = graph.add_node(Box::new(IntNode::new(2)));
    let b = graph.add_node(Box::new(IntNode::new(3)));
    let add = graph.add_node(Box::new(AddNode::default()));

    graph
        .connect(PortAddress::new(a, "out"), PortAddress::new(add, "a"))
        .unwrap();
    graph
        .connect(PortAddress::new(b, "out"), PortAddress::new(add, "b"))
        .unwrap();

    let mut processor = GraphProcessor::new();
    processor.update_compute_order(&mut graph);

    // Both constants rank before the adder
    let rank_a = graph.compute_order(a).unwrap();
    let rank_b = graph.compute_order(b).unwrap();
    let rank_add = graph.compute_order(add).unwrap();
    assert!(rank_add > rank_a);
    assert!(rank_add > rank_b);

    let report = processor.run(&mut graph).unwrap();
    assert!(report.success());
    assert_eq!(report.executed, 3);
    assert_eq!(
        graph.output_value(add, &PortRef::new("out")),
        Some(Value::Int(5))
    );
}

#[test]
fn run_requires_fresh_compute_order() {
    let mut graph = empty_graph();
    graph.add_node(Box::new(IntNode::new(1)));

    let mut processor = GraphProcessor::new();
    assert!(matches!(
        processor.run(&mut graph),
        Err(ProcessError::OrderOutdated)
    ));

    processor.update_compute_order(&mut graph);
    processor.run(&mut graph).unwrap();
    // No mutation in between: a second run is allowed
    assert_eq!(processor.state(), ProcessorState::Ordered);
    processor.run(&mut graph).unwrap();

    // A mutation invalidates the schedule
    graph.add_node(Box::new(IntNode::new(2)));
    assert!(matches!(
        processor.run(&mut graph),
        Err(ProcessError::OrderOutdated)
    ));
}

#[test]
fn failing_node_does_not_stop_independent_branch() {
    let mut graph = empty_graph();
    let feed = graph.add_node(Box::new(IntNode::new(7)));
    let fail = graph.add_node(Box::new(FailNode::default()));
    let lone = graph.add_node(Box::new(IntNode::new(11)));
    let log = graph.add_node(Box::new(LogNode::new("ok-branch")));

    graph
        .connect(PortAddress::new(feed, "out"), PortAddress::new(fail, "in"))
        .unwrap();
    graph
        .connect(PortAddress::new(lone, "out"), PortAddress::new(log, "in"))
        .unwrap();

    let mut processor = GraphProcessor::new();
    processor.update_compute_order(&mut graph);
    let report = processor.run(&mut graph).unwrap();

    assert!(!report.success());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].node, fail);
    // The failed node's output keeps its pre-run default
    assert_eq!(
        graph.output_value(fail, &PortRef::new("out")),
        Some(Value::Int(0))
    );
    assert!(graph.node(fail).unwrap().last_error().is_some());
    // The independent branch still ran
    assert_eq!(
        graph.output_value(log, &PortRef::new("out")),
        Some(Value::Int(11))
    );
}

#[test]
fn stop_on_error_aborts_the_pass() {
    let mut graph = empty_graph();
    graph.add_node(Box::new(FailNode::default()));

    let mut processor = GraphProcessor::with_config(ProcessorConfig {
        stop_on_error: true,
    });
    processor.update_compute_order(&mut graph);
    assert!(matches!(
        processor.run(&mut graph),
        Err(ProcessError::NodeFailed { .. })
    ));
}

#[test]
fn two_cycle_executes_neither_node() {
    let mut graph = empty_graph();
    let x = graph.add_node(Box::new(RelayNode::default()));
    let y = graph.add_node(Box::new(RelayNode::default()));
    let lone = graph.add_node(Box::new(IntNode::new(1)));

    graph
        .connect(PortAddress::new(x, "out"), PortAddress::new(y, "in"))
        .unwrap();
    graph
        .connect(PortAddress::new(y, "out"), PortAddress::new(x, "in"))
        .unwrap();

    let mut processor = GraphProcessor::new();
    processor.update_compute_order(&mut graph);
    assert_eq!(graph.compute_order(x), Some(LOOP_COMPUTE_ORDER));
    assert_eq!(graph.compute_order(y), Some(LOOP_COMPUTE_ORDER));

    let report = processor.run(&mut graph).unwrap();
    assert_eq!(report.executed, 1);
    assert_eq!(report.skipped, 2);
    let _ = lone;
}

#[test]
fn parameter_setter_feeds_same_pass_getter() {
    let mut graph = empty_graph();
    // Getter inserted first; the implicit dependency must still order the
    // setter ahead of it
    let getter = graph.add_node(Box::new(GetParamNode::new("speed")));
    let log = graph.add_node(Box::new(LogNode::new("speed")));
    let feed = graph.add_node(Box::new(IntNode::new(42)));
    let setter = graph.add_node(Box::new(SetParamNode::new("speed")));

    graph
        .connect(PortAddress::new(feed, "out"), PortAddress::new(setter, "in"))
        .unwrap();
    graph
        .connect(PortAddress::new(getter, "out"), PortAddress::new(log, "in"))
        .unwrap();

    let mut processor = GraphProcessor::new();
    processor.update_compute_order(&mut graph);
    let report = processor.run(&mut graph).unwrap();
    assert!(report.success());
    assert_eq!(graph.params().get("speed"), Some(Value::Int(42)));
    assert_eq!(
        graph.output_value(log, &PortRef::new("out")),
        Some(Value::Int(42))
    );
}

#[test]
fn multi_edge_input_sums_every_connection() {
    let mut graph = empty_graph();
    let sum = graph.add_node(Box::new(SumNode::default()));
    for n in [1i64, 2, 3, 4] {
        let id = graph.add_node(Box::new(IntNode::new(n)));
        graph
            .connect(PortAddress::new(id, "out"), PortAddress::new(sum, "values"))
            .unwrap();
    }

    let mut processor = GraphProcessor::new();
    processor.update_compute_order(&mut graph);
    processor.run(&mut graph).unwrap();
    assert_eq!(
        graph.output_value(sum, &PortRef::new("out")),
        Some(Value::Int(10))
    );
}

#[test]
fn float_input_converts_on_pull() {
    let mut graph = empty_graph();
    let f = graph.add_node(Box::new(FloatNode::new(2.5)));
    let one = graph.add_node(Box::new(IntNode::new(1)));
    let add = graph.add_node(Box::new(AddNode::default()));

    graph
        .connect(PortAddress::new(f, "out"), PortAddress::new(add, "a"))
        .unwrap();
    graph
        .connect(PortAddress::new(one, "out"), PortAddress::new(add, "b"))
        .unwrap();

    let mut processor = GraphProcessor::new();
    processor.update_compute_order(&mut graph);
    processor.run(&mut graph).unwrap();
    // 2.5 arrives as 2 through the float -> int adapter
    assert_eq!(
        graph.output_value(add, &PortRef::new("out")),
        Some(Value::Int(3))
    );
}
