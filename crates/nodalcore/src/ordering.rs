//! Compute-order assignment: cycle detection plus rank numbering.
//!
//! Ranks are cached on the graph and honored by both processors. Two
//! strategies are offered; `DepthFirst` is the documented default. They
//! produce different numberings but both satisfy the same invariant: for
//! every data edge A -> B with both ends rankable, `rank(A) < rank(B)`.

use crate::graph::Graph;
use crate::node::NodeId;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction as PetDirection;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Rank of a node that cannot execute (`can_process() == false`, or an
/// unorderable dependency chain under `LongestPath`).
pub const INVALID_COMPUTE_ORDER: i32 = -1;

/// Rank of a node that is part of a dependency cycle.
pub const LOOP_COMPUTE_ORDER: i32 = -2;

/// Recursion guard for the `LongestPath` strategy.
pub const MAX_DEPENDENCY_DEPTH: u32 = 1000;

/// How ranks are numbered once cycles have been flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingStrategy {
    /// Post-order depth-first topological sort; dense ranks 0,1,2,...
    #[default]
    DepthFirst,
    /// `max(rank of dependencies) + 1`; ranks grow with the longest
    /// dependency chain and are not necessarily dense.
    LongestPath,
}

pub(crate) fn compute(graph: &Graph) -> HashMap<NodeId, i32> {
    let (dag, index_of) = dependency_graph(graph);

    // Members of any non-trivial strongly connected component (or a
    // self-loop) never execute.
    let mut cyclic: HashSet<NodeId> = HashSet::new();
    for component in tarjan_scc(&dag) {
        let is_cycle = component.len() > 1
            || component
                .first()
                .is_some_and(|ix| dag.find_edge(*ix, *ix).is_some());
        if is_cycle {
            cyclic.extend(component.iter().map(|ix| dag[*ix]));
        }
    }

    match graph.strategy() {
        OrderingStrategy::DepthFirst => depth_first_ranks(graph, &dag, &index_of, &cyclic),
        OrderingStrategy::LongestPath => longest_path_ranks(graph, &dag, &index_of, &cyclic),
    }
}

/// The "depends on" graph: one arc per data edge from producer to consumer,
/// plus an implicit arc from every parameter setter to each same-name
/// getter.
fn dependency_graph(graph: &Graph) -> (DiGraph<NodeId, ()>, HashMap<NodeId, NodeIndex>) {
    let mut dag = DiGraph::new();
    let mut index_of = HashMap::new();
    for id in graph.node_ids() {
        index_of.insert(id, dag.add_node(id));
    }
    for (producer, consumer) in graph.dependency_edges() {
        if let (Some(&p), Some(&c)) = (index_of.get(&producer), index_of.get(&consumer)) {
            dag.add_edge(p, c, ());
        }
    }
    (dag, index_of)
}

fn depth_first_ranks(
    graph: &Graph,
    dag: &DiGraph<NodeId, ()>,
    index_of: &HashMap<NodeId, NodeIndex>,
    cyclic: &HashSet<NodeId>,
) -> HashMap<NodeId, i32> {
    let mut ranks: HashMap<NodeId, i32> = cyclic
        .iter()
        .map(|id| (*id, LOOP_COMPUTE_ORDER))
        .collect();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut next_rank = 0i32;
    for id in graph.node_ids() {
        visit(
            id, graph, dag, index_of, cyclic, &mut visited, &mut ranks, &mut next_rank,
        );
    }
    ranks
}

#[allow(clippy::too_many_arguments)]
fn visit(
    id: NodeId,
    graph: &Graph,
    dag: &DiGraph<NodeId, ()>,
    index_of: &HashMap<NodeId, NodeIndex>,
    cyclic: &HashSet<NodeId>,
    visited: &mut HashSet<NodeId>,
    ranks: &mut HashMap<NodeId, i32>,
    next_rank: &mut i32,
) {
    if cyclic.contains(&id) || !visited.insert(id) {
        return;
    }
    let Some(&ix) = index_of.get(&id) else {
        return;
    };
    // Producers finish first; petgraph iterates neighbors newest-first, so
    // restore insertion order for deterministic numbering.
    let mut producers: Vec<NodeId> = dag
        .neighbors_directed(ix, PetDirection::Incoming)
        .map(|p| dag[p])
        .collect();
    producers.reverse();
    for producer in producers {
        visit(
            producer, graph, dag, index_of, cyclic, visited, ranks, next_rank,
        );
    }
    let rank = if graph.node_can_process(id) {
        let rank = *next_rank;
        *next_rank += 1;
        rank
    } else {
        // Excluded nodes do not consume a sequence number
        INVALID_COMPUTE_ORDER
    };
    ranks.insert(id, rank);
}

fn longest_path_ranks(
    graph: &Graph,
    dag: &DiGraph<NodeId, ()>,
    index_of: &HashMap<NodeId, NodeIndex>,
    cyclic: &HashSet<NodeId>,
) -> HashMap<NodeId, i32> {
    let mut ranks: HashMap<NodeId, i32> = cyclic
        .iter()
        .map(|id| (*id, LOOP_COMPUTE_ORDER))
        .collect();
    let mut memo: HashMap<NodeId, i32> = HashMap::new();
    for id in graph.node_ids() {
        if cyclic.contains(&id) {
            continue;
        }
        let depth = chain_depth(id, 0, dag, index_of, cyclic, &mut memo);
        let rank = if depth < 0 || !graph.node_can_process(id) {
            INVALID_COMPUTE_ORDER
        } else {
            depth
        };
        ranks.insert(id, rank);
    }
    ranks
}

/// Longest dependency chain ending at `id`; negative means the recursion
/// guard tripped and the node is unorderable.
fn chain_depth(
    id: NodeId,
    level: u32,
    dag: &DiGraph<NodeId, ()>,
    index_of: &HashMap<NodeId, NodeIndex>,
    cyclic: &HashSet<NodeId>,
    memo: &mut HashMap<NodeId, i32>,
) -> i32 {
    if level > MAX_DEPENDENCY_DEPTH {
        return INVALID_COMPUTE_ORDER;
    }
    if let Some(&depth) = memo.get(&id) {
        return depth;
    }
    let Some(&ix) = index_of.get(&id) else {
        return INVALID_COMPUTE_ORDER;
    };
    let mut depth = 0i32;
    for producer in dag.neighbors_directed(ix, PetDirection::Incoming) {
        let producer = dag[producer];
        if cyclic.contains(&producer) {
            continue;
        }
        let upstream = chain_depth(producer, level + 1, dag, index_of, cyclic, memo);
        if upstream < 0 {
            memo.insert(id, INVALID_COMPUTE_ORDER);
            return INVALID_COMPUTE_ORDER;
        }
        depth = depth.max(upstream + 1);
    }
    memo.insert(id, depth);
    depth
}
