use std::fmt;

use serde::{Deserialize, Serialize};

use crate::output::NodeOutput;

const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_OUTPUT_LENGTH: u32 = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
  pub id: String,
  #[serde(rename = "type")]
  pub node_type: NodeType,
  #[serde(default)]
  pub position: Position,
  #[serde(default)]
  pub data: NodeData,
}

impl Node {
  pub fn new(id: impl Into<String>, node_type: NodeType, position: Position) -> Self {
    Self {
      id: id.into(),
      node_type,
      position,
      data: NodeData::default(),
    }
  }

  /// Set the node's own prompt text.
  #[must_use]
  pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
    self.data.prompt = prompt.into();
    self
  }

  /// Set the node's current output.
  #[must_use]
  pub fn with_output(mut self, output: NodeOutput) -> Self {
    self.data.output = Some(output);
    self
  }
}

/// Canvas position. Only `x` matters to the engine, as a scheduling tie-break.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
  pub x: f64,
  pub y: f64,
}

impl Position {
  pub fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }
}

/// The kind of work a node performs.
///
/// Type tags the engine has no executor for are kept as [`NodeType::Other`]
/// so a document round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
  /// Single prompt sent to a language model.
  PromptNode,
  /// Prompt applied to aggregated upstream input.
  ChainNode,
  /// Prompt rendered to an image.
  TextToImage,
  Other(String),
}

impl NodeType {
  pub fn as_str(&self) -> &str {
    match self {
      NodeType::PromptNode => "prompt_node",
      NodeType::ChainNode => "chain_node",
      NodeType::TextToImage => "txt_to_img",
      NodeType::Other(tag) => tag,
    }
  }
}

impl From<String> for NodeType {
  fn from(tag: String) -> Self {
    match tag.as_str() {
      "prompt_node" => NodeType::PromptNode,
      "chain_node" => NodeType::ChainNode,
      "txt_to_img" => NodeType::TextToImage,
      _ => NodeType::Other(tag),
    }
  }
}

impl From<&str> for NodeType {
  fn from(tag: &str) -> Self {
    NodeType::from(tag.to_string())
  }
}

impl From<NodeType> for String {
  fn from(node_type: NodeType) -> Self {
    match node_type {
      NodeType::Other(tag) => tag,
      known => known.as_str().to_string(),
    }
  }
}

impl fmt::Display for NodeType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Node payload edited by the canvas and written back by execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
  #[serde(default)]
  pub prompt: String,
  #[serde(default = "default_temperature")]
  pub temperature: f64,
  #[serde(default = "default_output_length")]
  pub output_length: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub output: Option<NodeOutput>,
  #[serde(default)]
  pub running: bool,
  /// Aggregated upstream prompt text used by the last run.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub prompt_input: String,
  /// Aggregated upstream `input` text used by the last run.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub input: String,
  /// Error from the last failed run, cleared on success.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl Default for NodeData {
  fn default() -> Self {
    Self {
      prompt: String::new(),
      temperature: DEFAULT_TEMPERATURE,
      output_length: DEFAULT_OUTPUT_LENGTH,
      output: None,
      running: false,
      prompt_input: String::new(),
      input: String::new(),
      error: None,
    }
  }
}

fn default_temperature() -> f64 {
  DEFAULT_TEMPERATURE
}

fn default_output_length() -> u32 {
  DEFAULT_OUTPUT_LENGTH
}
