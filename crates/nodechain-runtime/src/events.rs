//! Execution events and notifiers for observability.
//!
//! Events are emitted during a run so consumers can observe progress, stream
//! it to a UI, or record it in tests.

use nodechain_config::NodeOutput;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionEvent {
  /// A run has started.
  RunStarted { run_id: String },

  /// A node has started executing.
  NodeStarted { run_id: String, node_id: String },

  /// A node has completed successfully.
  NodeCompleted {
    run_id: String,
    node_id: String,
    output: NodeOutput,
  },

  /// A node has failed.
  NodeFailed {
    run_id: String,
    node_id: String,
    error: String,
  },

  /// A node was skipped because nothing can execute its type.
  NodeSkipped {
    run_id: String,
    node_id: String,
    node_type: String,
  },

  /// Global progress changed.
  ProgressChanged { run_id: String, progress: f64 },

  /// The run has completed.
  RunCompleted { run_id: String },

  /// The run has failed.
  RunFailed { run_id: String, error: String },
}

/// Trait for receiving execution events.
///
/// The runtime calls `notify` for each event; implementations decide what to
/// do with them.
pub trait ExecutionNotifier: Send + Sync {
  /// Called when an execution event occurs.
  fn notify(&self, event: ExecutionEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// A notifier that sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  // Unbounded so a slow consumer never stalls the run. Volume is a handful of
  // events per node.
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  /// Create a new channel notifier.
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // Receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
