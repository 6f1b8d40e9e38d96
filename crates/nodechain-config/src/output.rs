use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference to an image payload held in memory for the current session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageHandle(String);

impl ImageHandle {
  pub fn new(raw: impl Into<String>) -> Self {
    Self(raw.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for ImageHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// What a node produced on its last successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeOutput {
  Text(String),
  Image { image: ImageHandle },
}

impl NodeOutput {
  pub fn text(text: impl Into<String>) -> Self {
    NodeOutput::Text(text.into())
  }

  pub fn image(handle: ImageHandle) -> Self {
    NodeOutput::Image { image: handle }
  }

  /// The text this output contributes downstream. Images contribute nothing.
  pub fn as_text(&self) -> Option<&str> {
    match self {
      NodeOutput::Text(text) => Some(text),
      NodeOutput::Image { .. } => None,
    }
  }

  pub fn as_image(&self) -> Option<&ImageHandle> {
    match self {
      NodeOutput::Image { image } => Some(image),
      NodeOutput::Text(_) => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_output_shapes() {
    let text: NodeOutput = serde_json::from_value(json!("hello")).unwrap();
    assert_eq!(text.as_text(), Some("hello"));

    let image: NodeOutput = serde_json::from_value(json!({ "image": "blob:nodechain/1" })).unwrap();
    assert_eq!(image.as_text(), None);
    assert_eq!(image.as_image().map(|h| h.as_str()), Some("blob:nodechain/1"));
  }
}
