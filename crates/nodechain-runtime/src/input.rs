//! Upstream aggregation and prompt composition.
//!
//! A node's incoming edges are split by role: edges whose target handle is
//! `"input"` feed the **input** aggregate, everything else feeds the
//! **prompt** aggregate. Each edge contributes the upstream node's current
//! text output, joined with `"\n"` in edge order:
//!
//! ```text
//! a.output = "first"  --input-->  c
//! b.output = "second" --input-->  c      c.input  = "first\nsecond"
//! p.output = "Be brief" --------> c      c.prompt = "Be brief"
//! ```
//!
//! A missing upstream node, a node that has not produced output yet, and an
//! image output all contribute empty text.

use nodechain_store::GraphStore;
use nodechain_workflow::Workflow;

const SEPARATOR: &str = "\n";

/// How incoming edges are assigned to aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRoles {
  /// `"input"` edges feed the input aggregate, the rest feed the prompt.
  Split,
  /// Every edge feeds the prompt aggregate.
  PromptOnly,
}

/// Text gathered from a node's upstream neighbors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamText {
  pub prompt: String,
  pub input: String,
}

/// Gather upstream outputs for `node_id` along the snapshot's edges.
pub async fn gather_upstream(
  store: &dyn GraphStore,
  workflow: &Workflow,
  node_id: &str,
  roles: EdgeRoles,
) -> UpstreamText {
  let mut prompt_parts = Vec::new();
  let mut input_parts = Vec::new();

  for edge in workflow.incoming_edges(node_id) {
    let text = upstream_text(store, &edge.source).await;
    if roles == EdgeRoles::Split && edge.is_input() {
      input_parts.push(text);
    } else {
      prompt_parts.push(text);
    }
  }

  UpstreamText {
    prompt: prompt_parts.join(SEPARATOR),
    input: input_parts.join(SEPARATOR),
  }
}

async fn upstream_text(store: &dyn GraphStore, node_id: &str) -> String {
  store
    .node(node_id)
    .await
    .and_then(|node| node.data.output)
    .and_then(|output| output.as_text().map(str::to_string))
    .unwrap_or_default()
}

/// Combine a node's own prompt with the aggregated upstream prompt.
///
/// The node's own text comes first when both are present.
pub fn compose_prompt(node_prompt: &str, aggregated: &str) -> String {
  match (node_prompt.is_empty(), aggregated.is_empty()) {
    (_, true) => node_prompt.to_string(),
    (true, false) => aggregated.to_string(),
    (false, false) => format!("{}{}{}", node_prompt, SEPARATOR, aggregated),
  }
}
