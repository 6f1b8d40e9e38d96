use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use tracing::{debug, instrument};

use crate::config::ComputeConfig;
use crate::error::ComputeError;
use crate::types::{ChainRequest, ImagePayload, ImageRequest, OutputBody, PromptRequest};
use crate::ComputeService;

const DEFAULT_IMAGE_CONTENT_TYPE: &str = "image/png";

/// HTTP client for the compute service.
#[derive(Debug, Clone)]
pub struct HttpComputeService {
  base_url: String,
  user_id: String,
  http: Client,
}

impl HttpComputeService {
  /// Create a client for the service at `config.base_url`.
  ///
  /// Fails if the base address is not an http(s) URL or the HTTP client
  /// cannot be built.
  pub fn new(config: ComputeConfig) -> Result<Self, ComputeError> {
    let parsed = url::Url::parse(&config.base_url)
      .map_err(|e| ComputeError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
      return Err(ComputeError::InvalidUrl(format!(
        "URL must use http or https, got: {}",
        config.base_url
      )));
    }

    let mut builder = Client::builder();
    if let Some(timeout_ms) = config.timeout_ms {
      builder = builder.timeout(Duration::from_millis(timeout_ms));
    }

    Ok(Self {
      base_url: config.base_url.trim_end_matches('/').to_string(),
      user_id: config.user_id,
      http: builder.build()?,
    })
  }

  fn url(&self, endpoint: &str) -> String {
    format!("{}/api/run/{}", self.base_url, endpoint)
  }

  /// Issue a GET with `params` plus `userid`, failing on non-success status.
  async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Response, ComputeError> {
    debug!(endpoint = %endpoint, "compute_request");

    let response = self
      .http
      .get(self.url(endpoint))
      .query(params)
      .query(&[("userid", self.user_id.as_str())])
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(ComputeError::Status {
        status: status.as_u16(),
        body,
      });
    }

    Ok(response)
  }

  async fn get_output(&self, endpoint: &str, params: &[(&str, String)]) -> Result<String, ComputeError> {
    let body = self.get(endpoint, params).await?.text().await?;
    let parsed: OutputBody = serde_json::from_str(&body)?;
    Ok(parsed.output)
  }
}

#[async_trait]
impl ComputeService for HttpComputeService {
  async fn run_start(&self) -> Result<(), ComputeError> {
    self.get("start", &[]).await.map(|_| ())
  }

  async fn run_end(&self) -> Result<(), ComputeError> {
    self.get("end", &[]).await.map(|_| ())
  }

  #[instrument(name = "compute_prompt_node", skip_all)]
  async fn prompt_node(&self, request: &PromptRequest) -> Result<String, ComputeError> {
    let params = [
      ("prompt", request.prompt.clone()),
      ("temperature", request.temperature.to_string()),
      ("length", request.length.to_string()),
    ];
    self.get_output("prompt_node", &params).await
  }

  #[instrument(name = "compute_chain_node", skip_all)]
  async fn chain_node(&self, request: &ChainRequest) -> Result<String, ComputeError> {
    let params = [
      ("prompt", request.prompt.clone()),
      ("input", request.input.clone()),
      ("temperature", request.temperature.to_string()),
      ("length", request.length.to_string()),
    ];
    self.get_output("chain_node", &params).await
  }

  #[instrument(name = "compute_text_to_image", skip_all)]
  async fn text_to_image(&self, request: &ImageRequest) -> Result<ImagePayload, ComputeError> {
    let params = [("prompt", request.prompt.clone())];
    let response = self.get("txt_to_img_node", &params).await?;

    let content_type = response
      .headers()
      .get(CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .unwrap_or(DEFAULT_IMAGE_CONTENT_TYPE)
      .to_string();
    let bytes = response.bytes().await?;

    Ok(ImagePayload {
      bytes,
      content_type,
    })
  }
}
