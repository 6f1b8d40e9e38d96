use bytes::Bytes;
use serde::Deserialize;

/// Request for a prompt node.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
  pub prompt: String,
  pub temperature: f64,
  pub length: u32,
}

/// Request for a chain node.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainRequest {
  pub prompt: String,
  pub input: String,
  pub temperature: f64,
  pub length: u32,
}

/// Request for a text-to-image node.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
  pub prompt: String,
}

/// Binary image returned by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
  pub bytes: Bytes,
  pub content_type: String,
}

/// JSON body returned by the text-generating endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct OutputBody {
  pub output: String,
}
