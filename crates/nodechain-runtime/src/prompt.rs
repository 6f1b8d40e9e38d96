use std::sync::Arc;

use async_trait::async_trait;
use nodechain_compute::{ComputeService, PromptRequest};
use nodechain_config::{Node, NodeOutput};
use nodechain_store::NodeDataPatch;
use tracing::debug;

use crate::error::ExecutionError;
use crate::executor::{ExecutionContext, NodeExecutor};
use crate::input::{EdgeRoles, compose_prompt};

/// Runs `prompt_node` nodes: every incoming edge feeds the prompt.
pub struct PromptNodeExecutor {
  compute: Arc<dyn ComputeService>,
}

impl PromptNodeExecutor {
  pub fn new(compute: Arc<dyn ComputeService>) -> Self {
    Self { compute }
  }
}

#[async_trait]
impl NodeExecutor for PromptNodeExecutor {
  async fn execute(&self, ctx: &ExecutionContext, node: &Node) -> Result<NodeOutput, ExecutionError> {
    ctx.mark_running(&node.id).await?;

    let upstream = ctx.upstream(&node.id, EdgeRoles::PromptOnly).await;
    let request = PromptRequest {
      prompt: compose_prompt(&node.data.prompt, &upstream.prompt),
      temperature: node.data.temperature,
      length: node.data.output_length,
    };
    debug!(node_id = %node.id, prompt_len = request.prompt.len(), "prompt_node_request");

    let text = self
      .compute
      .prompt_node(&request)
      .await
      .map_err(|source| ExecutionError::Compute {
        node_id: node.id.clone(),
        source,
      })?;

    let output = NodeOutput::text(text);
    ctx
      .store
      .update_node_data(
        &node.id,
        NodeDataPatch::new()
          .prompt(node.data.prompt.clone())
          .prompt_input(upstream.prompt)
          .output(output.clone())
          .running(false)
          .clear_error(),
      )
      .await?;

    Ok(output)
  }
}
