//! Synchronous run-to-completion executor.

use chrono::Utc;
use nodalcore::{Graph, GraphEvent, NodeId, ProcessError, RunId};
use std::time::Instant;
use uuid::Uuid;

/// Where the processor is in its lifecycle.
///
/// `update_compute_order` moves `Idle -> Ordered`; `run` passes through
/// `Running` and lands back on `Ordered` while the graph is unmutated, or
/// on `Idle` once a mutation invalidates the cached order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Idle,
    Ordered,
    Running,
}

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Abort the pass on the first node failure instead of continuing.
    pub stop_on_error: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            stop_on_error: false,
        }
    }
}

/// One node's recorded failure within a run.
#[derive(Debug, Clone)]
pub struct NodeFailure {
    pub node: NodeId,
    pub error: String,
}

/// Outcome of one execution pass.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run: RunId,
    pub executed: usize,
    /// Nodes excluded by rank (-1 invalid, -2 cyclic).
    pub skipped: usize,
    pub failures: Vec<NodeFailure>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives a graph one full pass at a time: for every executable node in
/// ascending rank order, pull inputs, process, push outputs. A failing node
/// is recorded and skipped past; the rest of the pass still runs.
pub struct GraphProcessor {
    state: ProcessorState,
    config: ProcessorConfig,
    order: Vec<NodeId>,
}

impl GraphProcessor {
    pub fn new() -> Self {
        Self::with_config(ProcessorConfig::default())
    }

    pub fn with_config(config: ProcessorConfig) -> Self {
        Self {
            state: ProcessorState::Idle,
            config,
            order: Vec::new(),
        }
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    /// Recompute the graph's ranks and capture the execution schedule. Must
    /// be re-invoked after any graph mutation before the next [`run`].
    ///
    /// [`run`]: GraphProcessor::run
    pub fn update_compute_order(&mut self, graph: &mut Graph) {
        graph.update_compute_order();
        self.order = graph.executable_order();
        self.state = ProcessorState::Ordered;
    }

    /// Execute one pass. Refuses with [`ProcessError::OrderOutdated`] when
    /// the schedule is missing or the graph mutated since it was taken.
    pub fn run(&mut self, graph: &mut Graph) -> Result<RunReport, ProcessError> {
        if self.state != ProcessorState::Ordered || graph.order_dirty() {
            return Err(ProcessError::OrderOutdated);
        }
        self.state = ProcessorState::Running;
        let run = Uuid::new_v4();
        let run_started = Instant::now();
        tracing::info!(graph = graph.name(), nodes = self.order.len(), "starting run");
        graph.events().emit(GraphEvent::RunStarted {
            run,
            timestamp: Utc::now(),
        });
        graph.reset_buffers();

        let mut executed = 0usize;
        let mut failures = Vec::new();
        for node_id in self.order.clone() {
            let node_started = Instant::now();
            let outcome = graph
                .pull_inputs(node_id)
                .and_then(|_| graph.process_node(node_id));
            match outcome {
                Ok(()) => {
                    graph.push_outputs(node_id);
                    graph.record_node_error(node_id, None);
                    executed += 1;
                    graph.events().emit(GraphEvent::NodeProcessed {
                        run,
                        node: node_id,
                        duration_ms: node_started.elapsed().as_millis() as u64,
                        timestamp: Utc::now(),
                    });
                }
                Err(err) => {
                    // Outputs keep their prior values; downstream nodes see
                    // unwritten buffers and fall back to their defaults.
                    tracing::error!(node = %node_id, error = %err, "node failed");
                    graph.record_node_error(node_id, Some(err.to_string()));
                    graph.events().emit(GraphEvent::NodeFailed {
                        run,
                        node: node_id,
                        error: err.to_string(),
                        timestamp: Utc::now(),
                    });
                    failures.push(NodeFailure {
                        node: node_id,
                        error: err.to_string(),
                    });
                    if self.config.stop_on_error {
                        self.finish(graph, run, run_started, false);
                        return Err(ProcessError::NodeFailed {
                            node: node_id,
                            message: err.to_string(),
                        });
                    }
                }
            }
        }

        let duration_ms = self.finish(graph, run, run_started, failures.is_empty());
        Ok(RunReport {
            run,
            executed,
            skipped: graph.node_count() - self.order.len(),
            failures,
            duration_ms,
        })
    }

    fn finish(&mut self, graph: &Graph, run: RunId, started: Instant, success: bool) -> u64 {
        let duration_ms = started.elapsed().as_millis() as u64;
        graph.events().emit(GraphEvent::RunFinished {
            run,
            success,
            duration_ms,
            timestamp: Utc::now(),
        });
        tracing::info!(run = %run, success, duration_ms, "run finished");
        self.state = if graph.order_dirty() {
            ProcessorState::Idle
        } else {
            ProcessorState::Ordered
        };
        duration_ms
    }
}

impl Default for GraphProcessor {
    fn default() -> Self {
        Self::new()
    }
}
