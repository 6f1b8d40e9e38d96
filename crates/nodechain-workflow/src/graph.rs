use std::collections::HashMap;

use nodechain_config::{Edge, Node};
use tracing::warn;

/// Graph structure for scheduling and traversal.
#[derive(Debug, Clone)]
pub struct Graph {
  /// Node ids in original collection order.
  node_ids: Vec<String>,
  /// node_id -> position in `node_ids`.
  index: HashMap<String, usize>,
  /// Adjacency list: node_id -> list of downstream node_ids, in edge order.
  adjacency: HashMap<String, Vec<String>>,
  /// node_id -> number of direct predecessors.
  in_degree: HashMap<String, usize>,
}

impl Graph {
  /// Build a graph from nodes and edges.
  ///
  /// Edges whose source or target is not among `nodes` are skipped.
  pub fn new(nodes: &[Node], edges: &[Edge]) -> Self {
    let mut node_ids = Vec::with_capacity(nodes.len());
    let mut index = HashMap::with_capacity(nodes.len());
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::with_capacity(nodes.len());
    let mut in_degree: HashMap<String, usize> = HashMap::with_capacity(nodes.len());

    // Initialize all nodes
    for node in nodes {
      index.insert(node.id.clone(), node_ids.len());
      node_ids.push(node.id.clone());
      adjacency.entry(node.id.clone()).or_default();
      in_degree.entry(node.id.clone()).or_insert(0);
    }

    for edge in edges {
      if !index.contains_key(&edge.source) || !index.contains_key(&edge.target) {
        warn!(
          edge_id = %edge.id,
          source = %edge.source,
          target = %edge.target,
          "skipping edge that references an unknown node"
        );
        continue;
      }

      adjacency
        .entry(edge.source.clone())
        .or_default()
        .push(edge.target.clone());
      *in_degree.entry(edge.target.clone()).or_insert(0) += 1;
    }

    Self {
      node_ids,
      index,
      adjacency,
      in_degree,
    }
  }

  /// Node ids in original collection order.
  pub fn node_ids(&self) -> &[String] {
    &self.node_ids
  }

  /// Position of a node in the original collection.
  pub fn index_of(&self, node_id: &str) -> Option<usize> {
    self.index.get(node_id).copied()
  }

  /// The full adjacency list.
  pub fn adjacency(&self) -> &HashMap<String, Vec<String>> {
    &self.adjacency
  }

  /// The in-degree of every node.
  pub fn in_degrees(&self) -> &HashMap<String, usize> {
    &self.in_degree
  }

  /// Number of direct predecessors of a node (zero for unknown ids).
  pub fn in_degree(&self, node_id: &str) -> usize {
    self.in_degree.get(node_id).copied().unwrap_or(0)
  }

  /// Get downstream nodes for a given node.
  pub fn downstream(&self, node_id: &str) -> &[String] {
    self
      .adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use nodechain_config::{NodeType, Position};

  fn node(id: &str) -> Node {
    Node::new(id, NodeType::PromptNode, Position::default())
  }

  #[test]
  fn test_isolated_nodes_present() {
    let graph = Graph::new(&[node("a"), node("b")], &[]);

    assert_eq!(graph.adjacency().len(), 2);
    assert_eq!(graph.in_degrees().len(), 2);
    assert!(graph.downstream("a").is_empty());
    assert_eq!(graph.in_degree("b"), 0);
    assert_eq!(graph.node_ids().to_vec(), vec!["a", "b"]);
  }

  #[test]
  fn test_adjacency_and_in_degree() {
    let nodes = [node("a"), node("b"), node("c")];
    let edges = [
      Edge::new("e1", "a", "c"),
      Edge::new("e2", "b", "c"),
      Edge::new("e3", "a", "b"),
    ];
    let graph = Graph::new(&nodes, &edges);

    assert_eq!(graph.downstream("a").to_vec(), vec!["c", "b"]);
    assert_eq!(graph.in_degree("a"), 0);
    assert_eq!(graph.in_degree("b"), 1);
    assert_eq!(graph.in_degree("c"), 2);
    assert_eq!(graph.index_of("c"), Some(2));
  }

  #[test]
  fn test_unknown_endpoints_skipped() {
    let nodes = [node("a"), node("b")];
    let edges = [
      Edge::new("e1", "a", "ghost"),
      Edge::new("e2", "ghost", "b"),
      Edge::new("e3", "a", "b"),
    ];
    let graph = Graph::new(&nodes, &edges);

    assert_eq!(graph.downstream("a").to_vec(), vec!["b"]);
    assert_eq!(graph.in_degree("b"), 1);
    assert!(!graph.in_degrees().contains_key("ghost"));
  }
}
