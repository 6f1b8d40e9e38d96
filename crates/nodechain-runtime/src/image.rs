use std::sync::Arc;

use async_trait::async_trait;
use nodechain_compute::{ComputeService, ImageRequest};
use nodechain_config::{Node, NodeOutput};
use nodechain_store::NodeDataPatch;
use tracing::debug;

use crate::blob::BlobRegistry;
use crate::error::ExecutionError;
use crate::executor::{ExecutionContext, NodeExecutor};
use crate::input::{EdgeRoles, compose_prompt};

/// Runs `txt_to_img` nodes. The returned image is kept in the
/// [`BlobRegistry`] and the node's output points at it.
///
/// A node keeps at most one payload alive: the previous image is revoked once
/// a new one is stored, or when a failed request leaves the node without
/// output.
pub struct TextToImageExecutor {
  compute: Arc<dyn ComputeService>,
  blobs: BlobRegistry,
}

impl TextToImageExecutor {
  pub fn new(compute: Arc<dyn ComputeService>, blobs: BlobRegistry) -> Self {
    Self { compute, blobs }
  }

  /// Revoke the image the node pointed at before this execution.
  fn release_previous(&self, node: &Node) {
    let Some(previous) = node.data.output.as_ref().and_then(NodeOutput::as_image) else {
      return;
    };
    if self.blobs.revoke(previous) {
      debug!(node_id = %node.id, handle = %previous, "image_revoked");
    }
  }
}

#[async_trait]
impl NodeExecutor for TextToImageExecutor {
  async fn execute(&self, ctx: &ExecutionContext, node: &Node) -> Result<NodeOutput, ExecutionError> {
    ctx.mark_running(&node.id).await?;

    let upstream = ctx.upstream(&node.id, EdgeRoles::PromptOnly).await;
    let request = ImageRequest {
      prompt: compose_prompt(&node.data.prompt, &upstream.prompt),
    };

    let payload = match self.compute.text_to_image(&request).await {
      Ok(payload) => payload,
      Err(source) => {
        // The runtime clears the output of a failed node.
        self.release_previous(node);
        return Err(ExecutionError::Compute {
          node_id: node.id.clone(),
          source,
        });
      }
    };
    debug!(
      node_id = %node.id,
      bytes = payload.bytes.len(),
      content_type = %payload.content_type,
      "image_received"
    );

    let handle = self.blobs.insert(payload);
    let output = NodeOutput::image(handle.clone());
    let written = ctx
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
      .await;
    if let Err(e) = written {
      self.blobs.revoke(&handle);
      return Err(e.into());
    }

    self.release_previous(node);
    Ok(output)
  }
}
