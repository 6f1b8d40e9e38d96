//! Session-scoped storage for binary node outputs.
//!
//! Image payloads returned by the compute service are kept in memory and
//! referenced from node data by an [`ImageHandle`]. Handles stay valid until
//! revoked or until the registry is dropped.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use nodechain_compute::ImagePayload;
use nodechain_config::ImageHandle;

const HANDLE_PREFIX: &str = "blob:nodechain/";

/// Maps image handles to their payloads.
#[derive(Debug, Clone, Default)]
pub struct BlobRegistry {
  blobs: Arc<RwLock<HashMap<ImageHandle, ImagePayload>>>,
}

impl BlobRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Store a payload and mint a fresh handle for it.
  pub fn insert(&self, payload: ImagePayload) -> ImageHandle {
    let handle = ImageHandle::new(format!("{}{}", HANDLE_PREFIX, uuid::Uuid::new_v4()));
    self
      .blobs
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(handle.clone(), payload);
    handle
  }

  /// Look up the payload behind a handle.
  pub fn get(&self, handle: &ImageHandle) -> Option<ImagePayload> {
    self
      .blobs
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .get(handle)
      .cloned()
  }

  /// Release a payload. Returns whether the handle was live.
  pub fn revoke(&self, handle: &ImageHandle) -> bool {
    self
      .blobs
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .remove(handle)
      .is_some()
  }

  pub fn len(&self) -> usize {
    self.blobs.read().unwrap_or_else(PoisonError::into_inner).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
