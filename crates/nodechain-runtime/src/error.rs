//! Runtime error types.

use nodechain_compute::ComputeError;
use nodechain_store::StoreError;

/// Errors a single node execution can end with.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
  /// The compute service call failed.
  #[error("compute request failed for node '{node_id}': {source}")]
  Compute {
    node_id: String,
    #[source]
    source: ComputeError,
  },

  /// Reading or writing the graph store failed.
  #[error("store update failed: {0}")]
  Store(#[from] StoreError),
}

/// Errors that end a whole run (or a single-node invocation).
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
  /// The graph contains a cycle; nothing was executed.
  #[error("cycle detected among nodes: {}", nodes.join(", "))]
  CycleDetected { nodes: Vec<String> },

  /// Execution was cancelled.
  #[error("run cancelled")]
  Cancelled,

  /// A node failed while the runtime was configured to halt on failure.
  #[error("node '{node_id}' failed: {message}")]
  NodeFailed { node_id: String, message: String },

  /// A single-node invocation failed.
  #[error(transparent)]
  Execution(#[from] ExecutionError),

  /// The requested node is not in the store.
  #[error("node not found: {0}")]
  NodeNotFound(String),

  /// No executor is registered for the node's type.
  #[error("no executor registered for node type '{node_type}'")]
  NoExecutor { node_type: String },
}
