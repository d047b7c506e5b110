use nodalcore::{Graph, PortAddress, PortRef, TypeAdapters, Value};
use nodalnodes::{register_all, AddNode, ConcatNode, IntNode, StringNode};
use nodalruntime::{
    load_graph, save_graph, EdgeRecord, GraphDocument, GraphProcessor, NodeRecord, NodeRegistry,
};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

fn registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    register_all(&mut registry);
    registry
}

fn build_sample() -> Graph {
    let mut graph = Graph::new("sample", Arc::new(TypeAdapters::standard()));
    let a = graph.add_node(Box::new(IntNode::new(2)));
    let b = graph.add_node(Box::new(IntNode::new(3)));
    let add = graph.add_node(Box::new(AddNode::default()));
    graph
        .connect(PortAddress::new(a, "out"), PortAddress::new(add, "a"))
        .unwrap();
    graph
        .connect(PortAddress::new(b, "out"), PortAddress::new(add, "b"))
        .unwrap();
    graph.params().set("greeting", Value::String("hi".into()));
    graph
}

#[test]
fn round_trip_preserves_guids_endpoints_and_values() {
    let graph = build_sample();
    let document = save_graph(&graph);

    // Through JSON text, like the on-disk path
    let text = serde_json::to_string_pretty(&document).unwrap();
    let parsed: GraphDocument = serde_json::from_str(&text).unwrap();
    let mut restored = load_graph(&parsed, &registry(), Arc::new(TypeAdapters::standard()));

    let original_ids: HashSet<_> = graph.node_ids().collect();
    let restored_ids: HashSet<_> = restored.node_ids().collect();
    assert_eq!(original_ids, restored_ids);

    let endpoints = |g: &Graph| -> HashSet<(PortAddress, PortAddress)> {
        g.edges()
            .map(|e| (e.from.clone(), e.to.clone()))
            .collect()
    };
    assert_eq!(endpoints(&graph), endpoints(&restored));
    assert_eq!(
        restored.params().get("greeting"),
        Some(Value::String("hi".into()))
    );

    // The restored graph still computes 2 + 3
    let add_id = restored
        .nodes()
        .find(|(_, h)| h.type_name() == "math.add")
        .map(|(id, _)| id)
        .unwrap();
    let mut processor = GraphProcessor::new();
    processor.update_compute_order(&mut restored);
    processor.run(&mut restored).unwrap();
    assert_eq!(
        restored.output_value(add_id, &PortRef::new("out")),
        Some(Value::Int(5))
    );
}

#[test]
fn second_round_trip_is_identical() {
    let graph = build_sample();
    let first = save_graph(&graph);
    let restored = load_graph(&first, &registry(), Arc::new(TypeAdapters::standard()));
    let second = save_graph(&restored);

    let nodes = |doc: &GraphDocument| -> HashMap<Uuid, (String, serde_json::Value)> {
        doc.nodes
            .iter()
            .map(|n| (n.id, (n.type_tag.clone(), n.payload.clone())))
            .collect()
    };
    assert_eq!(nodes(&first), nodes(&second));
    assert_eq!(first.edges.len(), second.edges.len());
}

#[test]
fn unknown_node_type_is_dropped_with_its_edges() {
    let graph = build_sample();
    let mut document = save_graph(&graph);

    let bogus = Uuid::new_v4();
    document.nodes.push(NodeRecord {
        id: bogus,
        type_tag: "does.not.exist".to_string(),
        payload: serde_json::Value::Null,
    });
    let victim = document.nodes[2].id;
    document.edges.push(EdgeRecord {
        id: Uuid::new_v4(),
        from: PortAddress::new(bogus, "out"),
        to: PortAddress::new(victim, "a"),
    });

    let restored = load_graph(&document, &registry(), Arc::new(TypeAdapters::standard()));
    assert_eq!(restored.node_count(), 3);
    assert!(restored.node(bogus).is_none());
    // Only the two original edges survive
    assert_eq!(restored.edge_count(), 2);
}

#[test]
fn bad_payload_drops_only_that_node() {
    let mut document = GraphDocument {
        name: "partial".to_string(),
        strategy: Default::default(),
        parameters: HashMap::new(),
        nodes: vec![
            NodeRecord {
                id: Uuid::new_v4(),
                type_tag: "value.int".to_string(),
                payload: json!({ "value": "not an int" }),
            },
            NodeRecord {
                id: Uuid::new_v4(),
                type_tag: "debug.log".to_string(),
                payload: json!({ "label": "sink" }),
            },
        ],
        edges: Vec::new(),
    };
    let broken = document.nodes[0].id;
    document.edges.push(EdgeRecord {
        id: Uuid::new_v4(),
        from: PortAddress::new(broken, "out"),
        to: PortAddress::new(document.nodes[1].id, "in"),
    });

    let restored = load_graph(&document, &registry(), Arc::new(TypeAdapters::standard()));
    assert_eq!(restored.node_count(), 1);
    assert_eq!(restored.edge_count(), 0);
}

#[test]
fn edge_to_missing_port_is_dropped() {
    let graph = build_sample();
    let mut document = save_graph(&graph);
    let a = document.nodes[0].id;
    let add = document.nodes[2].id;
    document.edges.push(EdgeRecord {
        id: Uuid::new_v4(),
        from: PortAddress::new(a, "out"),
        to: PortAddress::new(add, "no_such_port"),
    });

    let restored = load_graph(&document, &registry(), Arc::new(TypeAdapters::standard()));
    assert_eq!(restored.edge_count(), 2);
}

#[test]
fn saved_config_survives_reload() {
    let mut graph = Graph::new("cfg", Arc::new(TypeAdapters::standard()));
    let hello = graph.add_node(Box::new(StringNode::new("hello")));
    let world = graph.add_node(Box::new(StringNode::new("world")));
    let concat = graph.add_node(Box::new(ConcatNode::new(", ")));
    graph
        .connect(PortAddress::new(hello, "out"), PortAddress::new(concat, "parts"))
        .unwrap();
    graph
        .connect(PortAddress::new(world, "out"), PortAddress::new(concat, "parts"))
        .unwrap();

    let document = save_graph(&graph);
    let mut restored = load_graph(&document, &registry(), Arc::new(TypeAdapters::standard()));
    let mut processor = GraphProcessor::new();
    processor.update_compute_order(&mut restored);
    processor.run(&mut restored).unwrap();
    assert_eq!(
        restored.output_value(concat, &PortRef::new("out")),
        Some(Value::String("hello, world".into()))
    );
}
