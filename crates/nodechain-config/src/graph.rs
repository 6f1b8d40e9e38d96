use serde::{Deserialize, Serialize};

use crate::edge::Edge;
use crate::node::Node;

/// A canvas graph document: the `{nodes, edges}` shape used by templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDef {
  #[serde(default)]
  pub nodes: Vec<Node>,
  #[serde(default)]
  pub edges: Vec<Edge>,
}

impl GraphDef {
  pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
    Self { nodes, edges }
  }

  /// Get a node by ID.
  pub fn get_node(&self, node_id: &str) -> Option<&Node> {
    self.nodes.iter().find(|n| n.id == node_id)
  }
}
