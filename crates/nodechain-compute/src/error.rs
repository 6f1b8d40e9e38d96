use thiserror::Error;

/// Errors that can occur when calling the compute service.
#[derive(Debug, Error)]
pub enum ComputeError {
  /// The request could not be sent or the response not read.
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// The service answered with a non-success status.
  #[error("compute service returned status {status}: {body}")]
  Status { status: u16, body: String },

  /// The response body was not what the operation expects.
  #[error("invalid response body: {0}")]
  Decode(#[from] serde_json::Error),

  /// The configured base address is not a valid http(s) URL.
  #[error("invalid base url: {0}")]
  InvalidUrl(String),
}
