//! Change and execution notifications, the sole channel back to UI layers.

use crate::edge::{EdgeId, PortAddress};
use crate::node::NodeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

pub type RunId = Uuid;

/// Everything observable about a graph from the outside: structural changes
/// and per-run execution progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GraphEvent {
    NodeAdded {
        node: NodeId,
        node_type: String,
        timestamp: DateTime<Utc>,
    },
    NodeRemoved {
        node: NodeId,
        timestamp: DateTime<Utc>,
    },
    NodeChanged {
        node: NodeId,
        timestamp: DateTime<Utc>,
    },
    EdgeConnected {
        edge: EdgeId,
        from: PortAddress,
        to: PortAddress,
        timestamp: DateTime<Utc>,
    },
    EdgeDisconnected {
        edge: EdgeId,
        from: PortAddress,
        to: PortAddress,
        timestamp: DateTime<Utc>,
    },
    RunStarted {
        run: RunId,
        timestamp: DateTime<Utc>,
    },
    RunFinished {
        run: RunId,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    NodeProcessed {
        run: RunId,
        node: NodeId,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    NodeFailed {
        run: RunId,
        node: NodeId,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

/// Broadcast bus for [`GraphEvent`]s. Emission never blocks; events are
/// dropped when nobody subscribed or a receiver lags.
pub struct EventBus {
    sender: broadcast::Sender<GraphEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GraphEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: GraphEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
