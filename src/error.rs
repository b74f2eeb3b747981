use thiserror::Error;

/// Errors raised while laying out a flow graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The edge set contains a cycle, so no node can be put strictly below all of its
    /// predecessors. `node` is the debug rendering of one node on the cycle.
    #[error("flow graph contains a cycle through node {node}")]
    CyclicGraph { node: String },
}

/// Errors raised while loading a [`crate::Canvas`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid canvas JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("canvas option `{field}` has invalid value {value}")]
    Invalid { field: &'static str, value: i32 },
}
