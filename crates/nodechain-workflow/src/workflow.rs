use nodechain_config::{Edge, GraphDef, Node};
use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::graph::Graph;
use crate::schedule;

/// Snapshot of a canvas graph taken at run start.
///
/// Scheduling and edge lookups during a run go through the snapshot, so edits
/// made on the canvas while a run is in progress do not affect it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
  pub nodes: Vec<Node>,
  pub edges: Vec<Edge>,
}

impl Workflow {
  pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
    Self { nodes, edges }
  }

  /// Build the graph structure for traversal.
  pub fn graph(&self) -> Graph {
    Graph::new(&self.nodes, &self.edges)
  }

  /// Get a node by ID.
  pub fn get_node(&self, node_id: &str) -> Option<&Node> {
    self.nodes.iter().find(|n| n.id == node_id)
  }

  /// Edges pointing at `node_id`, in collection order.
  pub fn incoming_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
    self.edges.iter().filter(move |e| e.target == node_id)
  }

  /// Execution order, silently leaving out nodes on cycles.
  pub fn topological_order(&self) -> Vec<String> {
    schedule::topological_order(&self.nodes, &self.edges)
  }

  /// Execution order, failing on cycles.
  pub fn try_topological_order(&self) -> Result<Vec<String>, WorkflowError> {
    schedule::try_topological_order(&self.nodes, &self.edges)
  }

  /// Execution order grouped into wavefronts, failing on cycles.
  pub fn wavefronts(&self) -> Result<Vec<Vec<String>>, WorkflowError> {
    schedule::wavefronts(&self.nodes, &self.edges)
  }
}

impl From<GraphDef> for Workflow {
  fn from(def: GraphDef) -> Self {
    Self::new(def.nodes, def.edges)
  }
}
