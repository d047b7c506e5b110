//! Standard node library
//!
//! Collection of built-in nodes for common operations

mod debug;
mod flow;
mod list;
mod math;
mod param;
mod string;
mod value;

pub use debug::LogNode;
pub use flow::RelayNode;
pub use list::CollectNode;
pub use math::{AddNode, MulNode, SubNode, SumNode};
pub use param::{GetParamNode, SetParamNode};
pub use string::ConcatNode;
pub use value::{BoolNode, FloatNode, IntNode, StringNode};

use nodalcore::NodeError;
use nodalruntime::NodeRegistry;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Register all standard nodes with a registry
pub fn register_all(registry: &mut NodeRegistry) {
    registry.register(Arc::new(value::IntNodeFactory));
    registry.register(Arc::new(value::FloatNodeFactory));
    registry.register(Arc::new(value::StringNodeFactory));
    registry.register(Arc::new(value::BoolNodeFactory));
    registry.register(Arc::new(math::AddNodeFactory));
    registry.register(Arc::new(math::SubNodeFactory));
    registry.register(Arc::new(math::MulNodeFactory));
    registry.register(Arc::new(math::SumNodeFactory));
    registry.register(Arc::new(string::ConcatNodeFactory));
    registry.register(Arc::new(list::CollectNodeFactory));
    registry.register(Arc::new(param::GetParamNodeFactory));
    registry.register(Arc::new(param::SetParamNodeFactory));
    registry.register(Arc::new(debug::LogNodeFactory));
    registry.register(Arc::new(flow::RelayNodeFactory));
}

/// Decode a factory payload; `null` falls back to the config's defaults.
pub(crate) fn parse_config<T: DeserializeOwned + Default>(
    payload: &serde_json::Value,
) -> Result<T, NodeError> {
    if payload.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(payload.clone()).map_err(|e| NodeError::Configuration(e.to_string()))
}
