//! Optional parallel backend: ready-set scheduling over the dependency DAG.
//!
//! Rank semantics match the synchronous processor; the extra guarantee is
//! that a node's pull only begins after every upstream producer's push has
//! been applied. Inputs are snapshotted and outputs written on the driver
//! loop, so edge buffers keep their single-writer-then-readers discipline.
//! Cancellation skips nodes that have not started; in-flight nodes finish.

use crate::processor::{NodeFailure, RunReport};
use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use nodalcore::{Graph, GraphEvent, NodeId, ProcessContext, ProcessError};
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Upper bound on concurrently processing nodes.
    pub max_parallel: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self { max_parallel: 8 }
    }
}

pub struct ParallelProcessor {
    config: ParallelConfig,
    cancel: CancellationToken,
}

impl ParallelProcessor {
    pub fn new() -> Self {
        Self::with_config(ParallelConfig::default())
    }

    pub fn with_config(config: ParallelConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Token to abort scheduling from elsewhere. Only not-yet-started nodes
    /// are affected.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(&self, graph: &mut Graph) -> Result<RunReport, ProcessError> {
        graph.update_compute_order();
        let run = Uuid::new_v4();
        let run_started = Instant::now();
        tracing::info!(graph = graph.name(), "starting parallel run");
        graph.events().emit(GraphEvent::RunStarted {
            run,
            timestamp: Utc::now(),
        });
        graph.reset_buffers();

        let schedule = graph.executable_order();
        let executable: HashSet<NodeId> = schedule.iter().copied().collect();
        // producer set per consumer; a node is ready once every producer
        // has finished its push (or been recorded as failed)
        let mut waits_on: HashMap<NodeId, HashSet<NodeId>> = schedule
            .iter()
            .map(|id| (*id, HashSet::new()))
            .collect();
        for (producer, consumer) in graph.dependency_edges() {
            if producer != consumer
                && executable.contains(&producer)
                && executable.contains(&consumer)
            {
                if let Some(waits) = waits_on.get_mut(&consumer) {
                    waits.insert(producer);
                }
            }
        }

        let mut started: HashSet<NodeId> = HashSet::new();
        let mut finished: HashSet<NodeId> = HashSet::new();
        let mut executed = 0usize;
        let mut failures: Vec<NodeFailure> = Vec::new();
        let mut running = FuturesUnordered::new();

        loop {
            if !self.cancel.is_cancelled() {
                let ready: Vec<NodeId> = schedule
                    .iter()
                    .copied()
                    .filter(|id| {
                        !started.contains(id)
                            && waits_on
                                .get(id)
                                .is_some_and(|waits| waits.is_subset(&finished))
                    })
                    .collect();
                for node_id in ready {
                    if running.len() >= self.config.max_parallel {
                        break;
                    }
                    started.insert(node_id);
                    let batches = match graph.snapshot_inputs(node_id) {
                        Ok(batches) => batches,
                        Err(err) => {
                            record_failure(graph, run, node_id, &err.to_string(), &mut failures);
                            finished.insert(node_id);
                            continue;
                        }
                    };
                    let Some(mut node) = graph.take_node(node_id) else {
                        finished.insert(node_id);
                        continue;
                    };
                    let params = graph.params().clone();
                    running.push(tokio::task::spawn_blocking(move || {
                        let work_started = Instant::now();
                        let mut outcome = Ok(());
                        for (port, values) in batches {
                            if let Err(err) = node.pull_input(&port, values) {
                                outcome = Err(err);
                                break;
                            }
                        }
                        if outcome.is_ok() {
                            let mut ctx = ProcessContext::new(node_id, params);
                            outcome = node.process(&mut ctx);
                        }
                        (
                            node_id,
                            node,
                            outcome,
                            work_started.elapsed().as_millis() as u64,
                        )
                    }));
                }
            }

            if running.is_empty() {
                break;
            }
            let Some(joined) = running.next().await else {
                break;
            };
            let (node_id, node, outcome, duration_ms) =
                joined.map_err(|err| ProcessError::Worker(err.to_string()))?;
            graph.restore_node(node_id, node);
            match outcome {
                Ok(()) => {
                    graph.push_outputs(node_id);
                    graph.record_node_error(node_id, None);
                    executed += 1;
                    graph.events().emit(GraphEvent::NodeProcessed {
                        run,
                        node: node_id,
                        duration_ms,
                        timestamp: Utc::now(),
                    });
                }
                Err(err) => {
                    tracing::error!(node = %node_id, error = %err, "node failed");
                    record_failure(graph, run, node_id, &err.to_string(), &mut failures);
                }
            }
            finished.insert(node_id);
        }

        let duration_ms = run_started.elapsed().as_millis() as u64;
        let cancelled = self.cancel.is_cancelled() && started.len() < schedule.len();
        graph.events().emit(GraphEvent::RunFinished {
            run,
            success: !cancelled && failures.is_empty(),
            duration_ms,
            timestamp: Utc::now(),
        });
        if cancelled {
            return Err(ProcessError::Cancelled);
        }
        Ok(RunReport {
            run,
            executed,
            skipped: graph.node_count() - schedule.len(),
            failures,
            duration_ms,
        })
    }
}

impl Default for ParallelProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn record_failure(
    graph: &mut Graph,
    run: nodalcore::RunId,
    node: NodeId,
    error: &str,
    failures: &mut Vec<NodeFailure>,
) {
    graph.record_node_error(node, Some(error.to_string()));
    graph.events().emit(GraphEvent::NodeFailed {
        run,
        node,
        error: error.to_string(),
        timestamp: Utc::now(),
    });
    failures.push(NodeFailure {
        node,
        error: error.to_string(),
    });
}
