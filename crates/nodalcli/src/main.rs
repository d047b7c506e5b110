use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use nodalcore::{
    Graph, GraphEvent, PortAddress, TypeAdapters, Value, LOOP_COMPUTE_ORDER,
};
use nodalruntime::{
    load_graph, read_file, save_graph, write_file, GraphProcessor, NodeRegistry,
    ParallelProcessor,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "nodal")]
#[command(about = "Node graph engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a graph file
    Run {
        /// Path to graph JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Parameter overrides as name=JSON pairs
        #[arg(short, long)]
        param: Vec<String>,

        /// Use the parallel execution backend
        #[arg(long)]
        parallel: bool,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a graph file and report unorderable nodes
    Validate {
        /// Path to graph JSON file
        file: PathBuf,
    },

    /// Print the compute order of a graph file
    Order {
        /// Path to graph JSON file
        file: PathBuf,
    },

    /// List available node types
    Nodes,

    /// Create a new example graph
    Init {
        /// Output file path
        #[arg(short, long, default_value = "graph.json")]
        output: PathBuf,
    },
}

/// Convert plain JSON into an engine value
fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::List(items.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(_) => Value::Null,
    }
}

fn standard_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    nodalnodes::register_all(&mut registry);
    registry
}

fn load_from(file: &PathBuf) -> Result<Graph> {
    let document = read_file(file).with_context(|| format!("reading {}", file.display()))?;
    let adapters = Arc::new(TypeAdapters::standard());
    adapters.warn_missing_reverse();
    let registry = standard_registry();
    Ok(load_graph(&document, &registry, adapters))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            param,
            parallel,
            verbose,
        } => {
            let level = if verbose {
                tracing::Level::DEBUG
            } else {
                tracing::Level::INFO
            };
            tracing_subscriber::fmt().with_max_level(level).init();

            run_graph(file, param, parallel).await?;
        }

        Commands::Validate { file } => {
            validate_graph(file)?;
        }

        Commands::Order { file } => {
            print_order(file)?;
        }

        Commands::Nodes => {
            list_nodes();
        }

        Commands::Init { output } => {
            create_example_graph(output)?;
        }
    }

    Ok(())
}

async fn run_graph(file: PathBuf, params: Vec<String>, parallel: bool) -> Result<()> {
    println!("🚀 Loading graph from: {}", file.display());
    let mut graph = load_from(&file)?;

    for pair in params {
        let (name, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("parameter override must be name=JSON: {pair}"))?;
        let json: serde_json::Value =
            serde_json::from_str(raw).with_context(|| format!("parsing override {name}"))?;
        graph.params().set(name, json_to_value(json));
    }

    println!("📋 Graph: {}", graph.name());
    println!("   Nodes: {}", graph.node_count());
    println!("   Edges: {}", graph.edge_count());
    println!();

    // Print execution events as they happen
    let mut events = graph.subscribe_events();
    let event_task = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                GraphEvent::RunStarted { .. } => {
                    println!("▶️  Run started");
                }
                GraphEvent::NodeProcessed {
                    node, duration_ms, ..
                } => {
                    println!("  ✅ Node {} processed in {}ms", node, duration_ms);
                }
                GraphEvent::NodeFailed { node, error, .. } => {
                    println!("  ❌ Node {} failed: {}", node, error);
                }
                GraphEvent::RunFinished {
                    success,
                    duration_ms,
                    ..
                } => {
                    if success {
                        println!("✨ Run completed successfully in {}ms", duration_ms);
                    } else {
                        println!("💥 Run finished with failures after {}ms", duration_ms);
                    }
                }
                _ => {}
            }
        }
    });

    let report = if parallel {
        let processor = ParallelProcessor::new();
        processor.run(&mut graph).await?
    } else {
        let mut processor = GraphProcessor::new();
        processor.update_compute_order(&mut graph);
        processor.run(&mut graph)?
    };

    // Let the event printer drain
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    event_task.abort();

    println!();
    println!("📊 Run Summary:");
    println!("   Run ID: {}", report.run);
    println!("   Executed: {} nodes", report.executed);
    println!("   Skipped: {} nodes", report.skipped);
    if !report.failures.is_empty() {
        println!("   Failures:");
        for failure in &report.failures {
            println!("     {}: {}", failure.node, failure.error);
        }
    }

    let mut printed_header = false;
    for (id, handle) in graph.nodes() {
        let outputs = graph.node_outputs(id);
        if outputs.is_empty() {
            continue;
        }
        if !printed_header {
            println!();
            println!("📤 Outputs:");
            printed_header = true;
        }
        println!("   {} ({}):", id, handle.type_name());
        for (port, value) in outputs {
            println!("     {}: {:?}", port, value);
        }
    }

    Ok(())
}

fn validate_graph(file: PathBuf) -> Result<()> {
    println!("🔍 Validating graph: {}", file.display());

    let document = read_file(&file)?;
    let mut graph = load_from(&file)?;
    graph.update_compute_order();

    let dropped_nodes = document.nodes.len().saturating_sub(graph.node_count());
    let dropped_edges = document.edges.len().saturating_sub(graph.edge_count());
    let cyclic: Vec<_> = graph
        .nodes()
        .filter(|(_, h)| h.compute_order() == LOOP_COMPUTE_ORDER)
        .map(|(id, _)| id)
        .collect();

    println!("✅ Graph loaded:");
    println!("   Name: {}", graph.name());
    println!("   Nodes: {} ({} dropped)", graph.node_count(), dropped_nodes);
    println!("   Edges: {} ({} dropped)", graph.edge_count(), dropped_edges);
    if !cyclic.is_empty() {
        println!("   ⚠️  {} node(s) in a cycle will never execute:", cyclic.len());
        for id in cyclic {
            println!("     {}", id);
        }
    }

    Ok(())
}

fn print_order(file: PathBuf) -> Result<()> {
    let mut graph = load_from(&file)?;
    graph.update_compute_order();

    let mut rows: Vec<(i32, String, String)> = graph
        .nodes()
        .map(|(id, handle)| (handle.compute_order(), handle.type_name().to_string(), id.to_string()))
        .collect();
    rows.sort_by_key(|(rank, _, _)| *rank);

    println!("📐 Compute order for {}:", graph.name());
    for (rank, node_type, id) in rows {
        let marker = match rank {
            -2 => "cycle".to_string(),
            -1 => "excluded".to_string(),
            r => r.to_string(),
        };
        println!("  {:>8}  {}  {}", marker, node_type, id);
    }

    Ok(())
}

fn list_nodes() {
    println!("📦 Available Node Types:");
    println!();

    let registry = standard_registry();
    for node_type in registry.list_types() {
        if let Some(info) = registry.info(&node_type) {
            println!("  • {} ({})", node_type, info.category);
            if !info.description.is_empty() {
                println!("    {}", info.description);
            }
        } else {
            println!("  • {}", node_type);
        }
    }
}

fn create_example_graph(output: PathBuf) -> Result<()> {
    use nodalnodes::{AddNode, IntNode, LogNode};

    let adapters = Arc::new(TypeAdapters::standard());
    let mut graph = Graph::new("Example Add Graph", adapters);

    let two = graph.add_node(Box::new(IntNode::new(2)));
    let three = graph.add_node(Box::new(IntNode::new(3)));
    let add = graph.add_node(Box::new(AddNode::default()));
    let log = graph.add_node(Box::new(LogNode::new("sum")));

    graph.connect(PortAddress::new(two, "out"), PortAddress::new(add, "a"))?;
    graph.connect(PortAddress::new(three, "out"), PortAddress::new(add, "b"))?;
    graph.connect(PortAddress::new(add, "out"), PortAddress::new(log, "in"))?;

    let document = save_graph(&graph);
    write_file(&output, &document)?;

    println!("✨ Created example graph: {}", output.display());
    println!();
    println!("Run it with:");
    println!("  nodal run --file {}", output.display());

    Ok(())
}
