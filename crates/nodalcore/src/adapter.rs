//! Type compatibility rules and value conversion between port kinds.
//!
//! Adapters are registered once at startup on an explicit [`TypeAdapters`]
//! object which the graph and processors share by `Arc`. Tests build their
//! own registries for isolation.

use crate::value::{Value, ValueKind};
use std::collections::{HashMap, HashSet};

/// Pure conversion from one value kind to another.
///
/// Returns `None` when the concrete value cannot be represented in the
/// target kind (e.g. a non-numeric string into `Int`).
pub type ConvertFn = fn(&Value) -> Option<Value>;

/// Registry of cross-kind conversions and explicit incompatibilities.
pub struct TypeAdapters {
    converters: HashMap<(ValueKind, ValueKind), ConvertFn>,
    incompatible: HashSet<(ValueKind, ValueKind)>,
}

impl TypeAdapters {
    /// An empty registry: only equal kinds and `Any` are connectable.
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
            incompatible: HashSet::new(),
        }
    }

    /// The stock conversion set used by the standard node library.
    pub fn standard() -> Self {
        let mut adapters = Self::empty();
        adapters.register(ValueKind::Int, ValueKind::Float, int_to_float);
        adapters.register(ValueKind::Float, ValueKind::Int, float_to_int);
        adapters.register(ValueKind::Bool, ValueKind::Int, bool_to_int);
        adapters.register(ValueKind::Int, ValueKind::Bool, int_to_bool);
        adapters.register(ValueKind::Int, ValueKind::String, to_display_string);
        adapters.register(ValueKind::Float, ValueKind::String, to_display_string);
        adapters.register(ValueKind::Bool, ValueKind::String, to_display_string);
        adapters
    }

    pub fn register(&mut self, from: ValueKind, to: ValueKind, convert: ConvertFn) {
        self.converters.insert((from, to), convert);
    }

    /// Forbid a pair even if the kinds would otherwise be connectable.
    pub fn mark_incompatible(&mut self, from: ValueKind, to: ValueKind) {
        self.incompatible.insert((from, to));
    }

    /// Whether an output of kind `from` may be wired into an input of kind `to`.
    pub fn compatible(&self, from: ValueKind, to: ValueKind) -> bool {
        if self.incompatible.contains(&(from, to)) {
            return false;
        }
        if from == to || from == ValueKind::Any || to == ValueKind::Any {
            return true;
        }
        self.converters.contains_key(&(from, to))
    }

    /// Convert `value` into kind `to`, applying a registered adapter when the
    /// kinds differ. `None` means no adapter covers the pair or the concrete
    /// value does not fit the target.
    pub fn convert(&self, value: &Value, to: ValueKind) -> Option<Value> {
        if to == ValueKind::Any || value.kind() == to {
            return Some(value.clone());
        }
        let convert = self.converters.get(&(value.kind(), to))?;
        convert(value)
    }

    /// Log a configuration warning for every forward conversion whose reverse
    /// is absent. Asymmetric registries are legal, just worth flagging once
    /// at startup.
    pub fn warn_missing_reverse(&self) {
        for (from, to) in self.converters.keys() {
            if !self.converters.contains_key(&(*to, *from)) {
                tracing::warn!(
                    "adapter {from} -> {to} has no registered reverse conversion"
                );
            }
        }
    }
}

impl Default for TypeAdapters {
    fn default() -> Self {
        Self::standard()
    }
}

fn int_to_float(v: &Value) -> Option<Value> {
    v.as_int().map(|n| Value::Float(n as f64))
}

fn float_to_int(v: &Value) -> Option<Value> {
    v.as_float().map(|n| Value::Int(n as i64))
}

fn bool_to_int(v: &Value) -> Option<Value> {
    v.as_bool().map(|b| Value::Int(i64::from(b)))
}

fn int_to_bool(v: &Value) -> Option<Value> {
    v.as_int().map(|n| Value::Bool(n != 0))
}

fn to_display_string(v: &Value) -> Option<Value> {
    let s = match v {
        Value::Int(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    Some(Value::String(s))
}
