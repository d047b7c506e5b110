use nodalcore::{Graph, PortAddress, PortRef, TypeAdapters, Value};
use nodalnodes::{CollectNode, IntNode};
use nodalruntime::GraphProcessor;
use std::sync::Arc;

fn empty_graph() -> Graph {
    Graph::new("dynamic", Arc::new(TypeAdapters::standard()))
}

#[test]
fn collector_gathers_values_in_slot_order() {
    let mut graph = empty_graph();
    let collect = graph.add_node(Box::new(CollectNode::default()));
    let mut sources = Vec::new();
    for (slot, n) in [(0u32, 10i64), (1, 20), (2, 30)] {
        let id = graph.add_node(Box::new(IntNode::new(n)));
        graph
            .connect(
                PortAddress::new(id, "out"),
                PortAddress::new(collect, "items").with_ident(slot.to_string()),
            )
            .unwrap();
        sources.push(id);
    }

    // One trailing empty slot is always present
    let input_count = graph.node(collect).unwrap().inputs().len();
    assert_eq!(input_count, 4);

    let mut processor = GraphProcessor::new();
    processor.update_compute_order(&mut graph);
    processor.run(&mut graph).unwrap();
    assert_eq!(
        graph.output_value(collect, &PortRef::new("out")),
        Some(Value::List(vec![
            Value::Int(10),
            Value::Int(20),
            Value::Int(30),
        ]))
    );
}

#[test]
fn disconnecting_a_slot_shrinks_the_collector() {
    let mut graph = empty_graph();
    let collect = graph.add_node(Box::new(CollectNode::default()));
    let first_source = graph.add_node(Box::new(IntNode::new(10)));
    let second_source = graph.add_node(Box::new(IntNode::new(20)));

    let first = graph
        .connect(
            PortAddress::new(first_source, "out"),
            PortAddress::new(collect, "items").with_ident("0"),
        )
        .unwrap();
    graph
        .connect(
            PortAddress::new(second_source, "out"),
            PortAddress::new(collect, "items").with_ident("1"),
        )
        .unwrap();

    graph.disconnect(first).unwrap();
    // Slot 0 is gone, slot 1 keeps its edge, one trailing slot remains
    let idents: Vec<Option<String>> = graph
        .node(collect)
        .unwrap()
        .inputs()
        .iter()
        .map(|p| p.ident().map(str::to_string))
        .collect();
    assert_eq!(idents, vec![Some("1".to_string()), Some("2".to_string())]);

    let mut processor = GraphProcessor::new();
    processor.update_compute_order(&mut graph);
    processor.run(&mut graph).unwrap();
    assert_eq!(
        graph.output_value(collect, &PortRef::new("out")),
        Some(Value::List(vec![Value::Int(20)]))
    );
}
