//! Nodechain Compute
//!
//! The remote compute service performs language-model inference and image
//! generation. This crate defines the contract the run engine uses to reach
//! it ([`ComputeService`]) and an HTTP implementation of that contract
//! ([`HttpComputeService`]).
//!
//! All requests are `GET`s under `{base_url}/api/run/` with URL-encoded query
//! parameters and the caller's `userid`.

mod client;
mod config;
mod error;
mod types;

pub use client::HttpComputeService;
pub use config::ComputeConfig;
pub use error::ComputeError;
pub use types::{ChainRequest, ImagePayload, ImageRequest, PromptRequest};

use async_trait::async_trait;

/// Operations offered by the remote compute service.
#[async_trait]
pub trait ComputeService: Send + Sync {
  /// Announce that a run is starting.
  async fn run_start(&self) -> Result<(), ComputeError>;

  /// Announce that a run has finished.
  async fn run_end(&self) -> Result<(), ComputeError>;

  /// Generate text from a prompt.
  async fn prompt_node(&self, request: &PromptRequest) -> Result<String, ComputeError>;

  /// Generate text from a prompt applied to aggregated input.
  async fn chain_node(&self, request: &ChainRequest) -> Result<String, ComputeError>;

  /// Render a prompt to an image.
  async fn text_to_image(&self, request: &ImageRequest) -> Result<ImagePayload, ComputeError>;
}
