use std::sync::Arc;

use async_trait::async_trait;
use nodechain_compute::{ChainRequest, ComputeService};
use nodechain_config::{Node, NodeOutput};
use nodechain_store::NodeDataPatch;
use tracing::debug;

use crate::error::ExecutionError;
use crate::executor::{ExecutionContext, NodeExecutor};
use crate::input::{EdgeRoles, compose_prompt};

/// Runs `chain_node` nodes: `"input"` edges feed the input text sent along
/// with the prompt, other edges extend the prompt.
pub struct ChainNodeExecutor {
  compute: Arc<dyn ComputeService>,
}

impl ChainNodeExecutor {
  pub fn new(compute: Arc<dyn ComputeService>) -> Self {
    Self { compute }
  }
}

#[async_trait]
impl NodeExecutor for ChainNodeExecutor {
  async fn execute(&self, ctx: &ExecutionContext, node: &Node) -> Result<NodeOutput, ExecutionError> {
    ctx.mark_running(&node.id).await?;

    let upstream = ctx.upstream(&node.id, EdgeRoles::Split).await;
    let request = ChainRequest {
      prompt: compose_prompt(&node.data.prompt, &upstream.prompt),
      input: upstream.input.clone(),
      temperature: node.data.temperature,
      length: node.data.output_length,
    };
    debug!(
      node_id = %node.id,
      prompt_len = request.prompt.len(),
      input_len = request.input.len(),
      "chain_node_request"
    );

    let text = self
      .compute
      .chain_node(&request)
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
          .input(upstream.input)
          .output(output.clone())
          .running(false)
          .clear_error(),
      )
      .await?;

    Ok(output)
  }
}
