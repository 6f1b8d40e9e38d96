//! Run result types.

use nodechain_config::NodeType;
use serde::{Deserialize, Serialize};

/// How a visited node ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NodeStatus {
  Succeeded,
  Failed { error: String },
  /// No executor for the node's type, or the node disappeared from the store.
  Skipped,
}

impl NodeStatus {
  pub fn is_failed(&self) -> bool {
    matches!(self, NodeStatus::Failed { .. })
  }
}

/// Outcome of one scheduled node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeReport {
  pub node_id: String,
  pub node_type: NodeType,
  #[serde(flatten)]
  pub status: NodeStatus,
}

/// Result of a complete run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
  /// Unique run ID.
  pub run_id: String,
  /// Execution order the scheduler produced.
  pub order: Vec<String>,
  /// One report per visited node, in schedule order.
  pub node_reports: Vec<NodeReport>,
}

impl RunResult {
  /// Get the report for a node.
  pub fn report(&self, node_id: &str) -> Option<&NodeReport> {
    self.node_reports.iter().find(|r| r.node_id == node_id)
  }

  /// Nodes that failed.
  pub fn failed(&self) -> impl Iterator<Item = &NodeReport> {
    self.node_reports.iter().filter(|r| r.status.is_failed())
  }
}
