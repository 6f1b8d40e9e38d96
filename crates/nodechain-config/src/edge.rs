use serde::{Deserialize, Serialize};

/// Handle label marking a data-input edge. Every other label, including
/// an absent one, marks a prompt edge.
pub const INPUT_HANDLE: &str = "input";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
  pub id: String,
  pub source: String,
  pub target: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_handle: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_handle: Option<String>,
}

impl Edge {
  /// Create a prompt edge with no handle labels.
  pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      source: source.into(),
      target: target.into(),
      source_handle: None,
      target_handle: None,
    }
  }

  /// Set the target handle label.
  #[must_use]
  pub fn with_target_handle(mut self, handle: impl Into<String>) -> Self {
    self.target_handle = Some(handle.into());
    self
  }

  /// Whether this edge feeds the target's input aggregate.
  pub fn is_input(&self) -> bool {
    self.target_handle.as_deref() == Some(INPUT_HANDLE)
  }
}
