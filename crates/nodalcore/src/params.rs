//! Named external values shared between a graph and its parameter nodes.

use crate::value::Value;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Key-value store for graph-level parameters.
///
/// Parameter nodes address values by name, never by reference, so a name can
/// be remapped without rewiring the graph. The store is a cheap clone of a
/// shared handle; the synchronous and parallel processors use the same one.
#[derive(Clone, Default)]
pub struct ParameterStore {
    inner: Arc<RwLock<HashMap<String, Value>>>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner.read().get(name).cloned()
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.inner.write().insert(name.into(), value);
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.inner.write().remove(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.inner.read().keys().cloned().collect()
    }

    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.inner.read().clone()
    }

    /// Replace the whole contents, used when restoring a serialized graph.
    pub fn restore(&self, values: HashMap<String, Value>) {
        *self.inner.write() = values;
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

/// How a node relates to a named parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterRole {
    Get,
    Set,
}

/// Declared by parameter nodes so the ordering pass can treat every setter
/// of a name as an implicit dependency of the getters of that name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterBinding {
    pub name: String,
    pub role: ParameterRole,
}

impl ParameterBinding {
    pub fn get(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: ParameterRole::Get,
        }
    }

    pub fn set(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: ParameterRole::Set,
        }
    }
}
