/// Configuration for reaching the compute service.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeConfig {
  /// Base address, e.g. `http://localhost:5000`.
  pub base_url: String,
  /// Identity sent as `userid` with every request.
  pub user_id: String,
  /// Per-request timeout. Without one a hung request blocks the run.
  pub timeout_ms: Option<u64>,
}

impl ComputeConfig {
  pub fn new(base_url: impl Into<String>, user_id: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into(),
      user_id: user_id.into(),
      timeout_ms: None,
    }
  }

  #[must_use]
  pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
    self.timeout_ms = Some(timeout_ms);
    self
  }
}
