//! Node executor trait and registry.
//!
//! Every node type the engine can run has one [`NodeExecutor`]. The runtime
//! looks executors up by [`NodeType`] in an [`ExecutorRegistry`], so adding a
//! node type means registering an executor rather than touching the runtime.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use nodechain_compute::ComputeService;
use nodechain_config::{Node, NodeOutput, NodeType};
use nodechain_store::{GraphStore, NodeDataPatch};
use nodechain_workflow::Workflow;

use crate::blob::BlobRegistry;
use crate::chain::ChainNodeExecutor;
use crate::error::ExecutionError;
use crate::image::TextToImageExecutor;
use crate::input::{EdgeRoles, UpstreamText, gather_upstream};
use crate::prompt::PromptNodeExecutor;

/// What an executor gets to work with.
#[derive(Clone)]
pub struct ExecutionContext {
  pub run_id: String,
  pub store: Arc<dyn GraphStore>,
  /// Snapshot taken at run start; incoming edges are read from here.
  pub workflow: Arc<Workflow>,
}

impl ExecutionContext {
  pub fn new(run_id: impl Into<String>, store: Arc<dyn GraphStore>, workflow: Arc<Workflow>) -> Self {
    Self {
      run_id: run_id.into(),
      store,
      workflow,
    }
  }

  /// Flag the node as running so the UI can lock it.
  pub async fn mark_running(&self, node_id: &str) -> Result<(), ExecutionError> {
    self
      .store
      .update_node_data(node_id, NodeDataPatch::new().running(true))
      .await?;
    Ok(())
  }

  /// Gather upstream text for a node.
  pub async fn upstream(&self, node_id: &str, roles: EdgeRoles) -> UpstreamText {
    gather_upstream(self.store.as_ref(), &self.workflow, node_id, roles).await
  }
}

/// Executes one node type against the compute service.
///
/// Implementations mark the node running, gather upstream text, call the
/// service and write prompt, aggregates, output and `running = false` back to
/// the store. On error they return without cleaning up; the runtime records
/// the failure on the node.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
  async fn execute(&self, ctx: &ExecutionContext, node: &Node) -> Result<NodeOutput, ExecutionError>;
}

/// Maps node types to their executors.
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
  executors: HashMap<NodeType, Arc<dyn NodeExecutor>>,
}

impl ExecutorRegistry {
  /// An empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// A registry with the built-in prompt, chain and text-to-image executors.
  pub fn with_defaults(compute: Arc<dyn ComputeService>, blobs: BlobRegistry) -> Self {
    let mut registry = Self::new();
    registry.register(
      NodeType::PromptNode,
      Arc::new(PromptNodeExecutor::new(compute.clone())),
    );
    registry.register(
      NodeType::ChainNode,
      Arc::new(ChainNodeExecutor::new(compute.clone())),
    );
    registry.register(
      NodeType::TextToImage,
      Arc::new(TextToImageExecutor::new(compute, blobs)),
    );
    registry
  }

  /// Register an executor, returning the one it replaces.
  pub fn register(
    &mut self,
    node_type: NodeType,
    executor: Arc<dyn NodeExecutor>,
  ) -> Option<Arc<dyn NodeExecutor>> {
    self.executors.insert(node_type, executor)
  }

  /// Get the executor for a node type.
  pub fn get(&self, node_type: &NodeType) -> Option<Arc<dyn NodeExecutor>> {
    self.executors.get(node_type).cloned()
  }

  pub fn contains(&self, node_type: &NodeType) -> bool {
    self.executors.contains_key(node_type)
  }
}

impl fmt::Debug for ExecutorRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ExecutorRegistry")
      .field("node_types", &self.executors.keys().collect::<Vec<_>>())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Echo;

  #[async_trait]
  impl NodeExecutor for Echo {
    async fn execute(&self, _ctx: &ExecutionContext, node: &Node) -> Result<NodeOutput, ExecutionError> {
      Ok(NodeOutput::text(node.data.prompt.clone()))
    }
  }

  #[test]
  fn test_register_and_replace() {
    let mut registry = ExecutorRegistry::new();
    let note = NodeType::from("note");

    assert!(registry.get(&note).is_none());
    assert!(registry.register(note.clone(), Arc::new(Echo)).is_none());
    assert!(registry.contains(&note));
    assert!(registry.register(note.clone(), Arc::new(Echo)).is_some());
    assert!(!registry.contains(&NodeType::PromptNode));
  }
}
