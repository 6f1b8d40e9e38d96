use nodechain_config::{NodeData, NodeOutput};

/// A partial update to a node's data. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDataPatch {
  pub prompt: Option<String>,
  pub prompt_input: Option<String>,
  pub input: Option<String>,
  pub output: Option<Option<NodeOutput>>,
  pub running: Option<bool>,
  pub error: Option<Option<String>>,
}

impl NodeDataPatch {
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
    self.prompt = Some(prompt.into());
    self
  }

  #[must_use]
  pub fn prompt_input(mut self, prompt_input: impl Into<String>) -> Self {
    self.prompt_input = Some(prompt_input.into());
    self
  }

  #[must_use]
  pub fn input(mut self, input: impl Into<String>) -> Self {
    self.input = Some(input.into());
    self
  }

  #[must_use]
  pub fn output(mut self, output: NodeOutput) -> Self {
    self.output = Some(Some(output));
    self
  }

  #[must_use]
  pub fn clear_output(mut self) -> Self {
    self.output = Some(None);
    self
  }

  #[must_use]
  pub fn running(mut self, running: bool) -> Self {
    self.running = Some(running);
    self
  }

  #[must_use]
  pub fn error(mut self, error: impl Into<String>) -> Self {
    self.error = Some(Some(error.into()));
    self
  }

  #[must_use]
  pub fn clear_error(mut self) -> Self {
    self.error = Some(None);
    self
  }

  /// Merge this patch into `data`.
  pub fn apply(self, data: &mut NodeData) {
    if let Some(prompt) = self.prompt {
      data.prompt = prompt;
    }
    if let Some(prompt_input) = self.prompt_input {
      data.prompt_input = prompt_input;
    }
    if let Some(input) = self.input {
      data.input = input;
    }
    if let Some(output) = self.output {
      data.output = output;
    }
    if let Some(running) = self.running {
      data.running = running;
    }
    if let Some(error) = self.error {
      data.error = error;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_apply_merges_only_set_fields() {
    let mut data = NodeData {
      prompt: "keep me".to_string(),
      output: Some(NodeOutput::text("old")),
      error: Some("boom".to_string()),
      ..NodeData::default()
    };

    NodeDataPatch::new()
      .running(true)
      .clear_error()
      .apply(&mut data);

    assert_eq!(data.prompt, "keep me");
    assert_eq!(data.output, Some(NodeOutput::text("old")));
    assert!(data.running);
    assert!(data.error.is_none());

    NodeDataPatch::new().clear_output().apply(&mut data);
    assert!(data.output.is_none());
  }
}
