use std::collections::HashMap;

use async_trait::async_trait;
use nodechain_config::{Edge, GraphDef, Node};
use tokio::sync::{RwLock, watch};

use crate::patch::NodeDataPatch;
use crate::{EdgeFilter, GraphStore, IDLE_PROGRESS, StoreError};

/// In-memory graph store.
///
/// Each node sits behind its own lock, so concurrent executors writing
/// different nodes never contend. Progress is published on a watch channel;
/// observers see the latest value.
#[derive(Debug)]
pub struct InMemoryGraphStore {
  order: Vec<String>,
  nodes: HashMap<String, RwLock<Node>>,
  edges: Vec<Edge>,
  progress: watch::Sender<f64>,
}

impl InMemoryGraphStore {
  pub fn new(graph: GraphDef) -> Self {
    let mut order = Vec::with_capacity(graph.nodes.len());
    let mut nodes = HashMap::with_capacity(graph.nodes.len());

    for node in graph.nodes {
      let id = node.id.clone();
      if nodes.insert(id.clone(), RwLock::new(node)).is_none() {
        order.push(id);
      }
    }

    let (progress, _) = watch::channel(IDLE_PROGRESS);

    Self {
      order,
      nodes,
      edges: graph.edges,
      progress,
    }
  }

  /// Subscribe to progress updates.
  pub fn subscribe_progress(&self) -> watch::Receiver<f64> {
    self.progress.subscribe()
  }
}

impl Default for InMemoryGraphStore {
  fn default() -> Self {
    Self::new(GraphDef::default())
  }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
  async fn node(&self, node_id: &str) -> Option<Node> {
    match self.nodes.get(node_id) {
      Some(node) => Some(node.read().await.clone()),
      None => None,
    }
  }

  async fn nodes(&self) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(self.order.len());
    for id in &self.order {
      if let Some(node) = self.nodes.get(id) {
        nodes.push(node.read().await.clone());
      }
    }
    nodes
  }

  async fn edges(&self, filter: &EdgeFilter) -> Vec<Edge> {
    self
      .edges
      .iter()
      .filter(|e| filter.matches(e))
      .cloned()
      .collect()
  }

  async fn update_node_data(&self, node_id: &str, patch: NodeDataPatch) -> Result<(), StoreError> {
    let node = self
      .nodes
      .get(node_id)
      .ok_or_else(|| StoreError::NodeNotFound(node_id.to_string()))?;
    patch.apply(&mut node.write().await.data);
    Ok(())
  }

  async fn set_progress(&self, progress: f64) {
    self.progress.send_replace(progress);
  }

  async fn progress(&self) -> f64 {
    *self.progress.borrow()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use nodechain_config::{NodeOutput, NodeType, Position};

  fn test_graph() -> GraphDef {
    GraphDef::new(
      vec![
        Node::new("b", NodeType::PromptNode, Position::default()),
        Node::new("a", NodeType::ChainNode, Position::default()),
      ],
      vec![Edge::new("e1", "b", "a"), Edge::new("e2", "a", "b")],
    )
  }

  #[tokio::test]
  async fn test_nodes_keep_collection_order() {
    let store = InMemoryGraphStore::new(test_graph());

    let ids: Vec<String> = store.nodes().await.into_iter().map(|n| n.id).collect();
    assert_eq!(ids, vec!["b", "a"]);
  }

  #[tokio::test]
  async fn test_update_node_data() {
    let store = InMemoryGraphStore::new(test_graph());

    store
      .update_node_data("a", NodeDataPatch::new().output(NodeOutput::text("done")))
      .await
      .unwrap();

    let node = store.node("a").await.unwrap();
    assert_eq!(node.data.output, Some(NodeOutput::text("done")));
    assert!(store.node("missing").await.is_none());
  }

  #[tokio::test]
  async fn test_update_unknown_node() {
    let store = InMemoryGraphStore::new(test_graph());

    let result = store
      .update_node_data("missing", NodeDataPatch::new().running(true))
      .await;
    assert!(matches!(result, Err(StoreError::NodeNotFound(id)) if id == "missing"));
  }

  #[tokio::test]
  async fn test_edges_filtered() {
    let store = InMemoryGraphStore::new(test_graph());

    let into_a = store.edges(&EdgeFilter::target("a")).await;
    assert_eq!(into_a.len(), 1);
    assert_eq!(into_a[0].id, "e1");
    assert_eq!(store.edges(&EdgeFilter::all()).await.len(), 2);
  }

  #[tokio::test]
  async fn test_progress_published() {
    let store = InMemoryGraphStore::new(test_graph());
    let receiver = store.subscribe_progress();

    assert_eq!(store.progress().await, IDLE_PROGRESS);
    store.set_progress(50.0).await;
    assert_eq!(store.progress().await, 50.0);
    assert_eq!(*receiver.borrow(), 50.0);
  }

  #[tokio::test]
  async fn test_snapshot() {
    let store = InMemoryGraphStore::new(test_graph());

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.nodes.len(), 2);
    assert_eq!(snapshot.edges.len(), 2);
  }
}
