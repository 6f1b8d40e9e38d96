//! Nodechain Store
//!
//! This crate provides the graph store contract the run engine consumes, and
//! an in-memory implementation of it.
//!
//! The [`GraphStore`] trait defines operations for:
//! - Reading nodes and (filtered) edges
//! - Merging partial data into a node
//! - Publishing global run progress
//!
//! The canvas owns the store; the engine receives it as an injected
//! `Arc<dyn GraphStore>` and never creates or removes nodes.

mod memory;
mod patch;

pub use memory::InMemoryGraphStore;
pub use patch::NodeDataPatch;

use async_trait::async_trait;
use nodechain_config::{Edge, Node};
use nodechain_workflow::Workflow;

/// Progress value meaning no run is in progress.
pub const IDLE_PROGRESS: f64 = 0.0;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// The requested node was not found.
  #[error("node not found: {0}")]
  NodeNotFound(String),
}

/// Selects edges by source and/or target node. An unset side matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeFilter {
  pub source: Option<String>,
  pub target: Option<String>,
}

impl EdgeFilter {
  /// Match every edge.
  pub fn all() -> Self {
    Self::default()
  }

  /// Match edges leaving `node_id`.
  pub fn source(node_id: impl Into<String>) -> Self {
    Self {
      source: Some(node_id.into()),
      target: None,
    }
  }

  /// Match edges entering `node_id`.
  pub fn target(node_id: impl Into<String>) -> Self {
    Self {
      source: None,
      target: Some(node_id.into()),
    }
  }

  pub fn matches(&self, edge: &Edge) -> bool {
    self.source.as_ref().is_none_or(|s| *s == edge.source)
      && self.target.as_ref().is_none_or(|t| *t == edge.target)
  }
}

/// Storage trait for the observable canvas graph.
#[async_trait]
pub trait GraphStore: Send + Sync {
  /// Get a node by ID.
  async fn node(&self, node_id: &str) -> Option<Node>;

  /// All nodes, in collection order.
  async fn nodes(&self) -> Vec<Node>;

  /// Edges matching `filter`, in collection order.
  async fn edges(&self, filter: &EdgeFilter) -> Vec<Edge>;

  /// Merge the set fields of `patch` into a node's data.
  async fn update_node_data(&self, node_id: &str, patch: NodeDataPatch) -> Result<(), StoreError>;

  /// Publish global run progress (0-100, [`IDLE_PROGRESS`] when idle).
  async fn set_progress(&self, progress: f64);

  /// Current global run progress.
  async fn progress(&self) -> f64;

  /// Take a snapshot of the current nodes and edges.
  async fn snapshot(&self) -> Workflow {
    Workflow::new(self.nodes().await, self.edges(&EdgeFilter::all()).await)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_edge_filter() {
    let edge = Edge::new("e1", "a", "b");

    assert!(EdgeFilter::all().matches(&edge));
    assert!(EdgeFilter::source("a").matches(&edge));
    assert!(!EdgeFilter::source("b").matches(&edge));
    assert!(EdgeFilter::target("b").matches(&edge));
    assert!(!EdgeFilter::target("a").matches(&edge));
  }
}
