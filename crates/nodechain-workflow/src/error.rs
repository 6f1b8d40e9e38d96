use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("cycle detected among nodes: {}", nodes.join(", "))]
  CycleDetected { nodes: Vec<String> },
}
