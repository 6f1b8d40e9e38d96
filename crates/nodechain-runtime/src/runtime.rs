//! Run orchestration.
//!
//! The [`Runtime`] is the main entry point for executing a canvas graph. It
//! snapshots the store, schedules the nodes, dispatches each one to the
//! executor registered for its type, and publishes progress as steps finish.

use std::pin::pin;
use std::sync::Arc;

use futures::StreamExt;
use nodechain_compute::ComputeService;
use nodechain_config::NodeOutput;
use nodechain_store::{GraphStore, NodeDataPatch};
use nodechain_workflow::{Workflow, WorkflowError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{ExecutionError, RuntimeError};
use crate::events::{ExecutionEvent, ExecutionNotifier, NoopNotifier};
use crate::executor::{ExecutionContext, ExecutorRegistry};
use crate::progress::{IDLE_PROGRESS, started_progress, step_progress};
use crate::result::{NodeReport, NodeStatus, RunResult};

/// How scheduled nodes are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
  /// One node at a time, in topological order.
  #[default]
  Sequential,
  /// Every node of a wavefront may run at once, up to `max_concurrency`;
  /// the next wavefront starts when the current one is done.
  Wavefront { max_concurrency: usize },
}

/// What the runtime does after a node fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
  /// Record the failure on the node and keep going. Dependents see empty
  /// text from the failed node.
  #[default]
  Continue,
  /// Record the failure and stop the run.
  Halt,
}

/// Configuration for the runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeConfig {
  pub mode: ExecutionMode,
  pub failure_policy: FailurePolicy,
}

/// The run engine.
pub struct Runtime {
  store: Arc<dyn GraphStore>,
  compute: Arc<dyn ComputeService>,
  registry: ExecutorRegistry,
  notifier: Arc<dyn ExecutionNotifier>,
  config: RuntimeConfig,
}

impl Runtime {
  pub fn new(
    store: Arc<dyn GraphStore>,
    compute: Arc<dyn ComputeService>,
    registry: ExecutorRegistry,
    config: RuntimeConfig,
  ) -> Self {
    Self {
      store,
      compute,
      registry,
      notifier: Arc::new(NoopNotifier),
      config,
    }
  }

  /// Send execution events to `notifier`.
  #[must_use]
  pub fn with_notifier(mut self, notifier: Arc<dyn ExecutionNotifier>) -> Self {
    self.notifier = notifier;
    self
  }

  pub fn config(&self) -> &RuntimeConfig {
    &self.config
  }

  /// Execute every node of the graph currently in the store.
  ///
  /// Progress is reset to idle and run-end is announced however the run
  /// ends, including on cycles and cancellation.
  #[instrument(name = "runtime_run", skip(self, cancel))]
  pub async fn run(&self, cancel: CancellationToken) -> Result<RunResult, RuntimeError> {
    let run_id = uuid::Uuid::new_v4().to_string();

    info!(run_id = %run_id, mode = ?self.config.mode, "run_started");
    if let Err(e) = self.compute.run_start().await {
      warn!(run_id = %run_id, error = %e, "run_start notification failed");
    }
    self.notifier.notify(ExecutionEvent::RunStarted {
      run_id: run_id.clone(),
    });

    let workflow = Arc::new(self.store.snapshot().await);
    let result = self.execute(&run_id, workflow, &cancel).await;

    self.publish_progress(&run_id, IDLE_PROGRESS).await;
    if let Err(e) = self.compute.run_end().await {
      warn!(run_id = %run_id, error = %e, "run_end notification failed");
    }

    match &result {
      Ok(run) => {
        info!(
          run_id = %run_id,
          nodes = run.node_reports.len(),
          failed = run.failed().count(),
          "run_completed"
        );
        self.notifier.notify(ExecutionEvent::RunCompleted { run_id });
      }
      Err(e) => {
        error!(run_id = %run_id, error = %e, "run_failed");
        self.notifier.notify(ExecutionEvent::RunFailed {
          run_id,
          error: e.to_string(),
        });
      }
    }

    result
  }

  /// Execute a single node in isolation against the current store contents.
  ///
  /// No progress is published and no run notifications are sent.
  #[instrument(name = "runtime_run_node", skip(self))]
  pub async fn run_node(&self, node_id: &str) -> Result<NodeOutput, RuntimeError> {
    let node = self
      .store
      .node(node_id)
      .await
      .ok_or_else(|| RuntimeError::NodeNotFound(node_id.to_string()))?;
    let executor = self
      .registry
      .get(&node.node_type)
      .ok_or_else(|| RuntimeError::NoExecutor {
        node_type: node.node_type.to_string(),
      })?;

    let run_id = uuid::Uuid::new_v4().to_string();
    let workflow = Arc::new(self.store.snapshot().await);
    let ctx = ExecutionContext::new(run_id, self.store.clone(), workflow);

    match executor.execute(&ctx, &node).await {
      Ok(output) => {
        info!(node_id = %node_id, "run_node_completed");
        Ok(output)
      }
      Err(e) => {
        error!(node_id = %node_id, error = %e, "run_node_failed");
        self.record_failure(node_id, &e).await;
        Err(e.into())
      }
    }
  }

  /// Schedule and run the snapshot.
  async fn execute(
    &self,
    run_id: &str,
    workflow: Arc<Workflow>,
    cancel: &CancellationToken,
  ) -> Result<RunResult, RuntimeError> {
    let (order, batches, limit) = match self.config.mode {
      ExecutionMode::Sequential => {
        let order = workflow.try_topological_order().map_err(graph_error)?;
        let batches: Vec<Vec<String>> = order.iter().map(|id| vec![id.clone()]).collect();
        (order, batches, 1)
      }
      ExecutionMode::Wavefront { max_concurrency } => {
        let waves: Vec<Vec<String>> = workflow.wavefronts().map_err(graph_error)?;
        let order: Vec<String> = waves.iter().flatten().cloned().collect();
        (order, waves, max_concurrency.max(1))
      }
    };

    let total = order.len();
    info!(run_id = %run_id, total = total, order = ?order, "run_scheduled");
    self.publish_progress(run_id, started_progress(total)).await;

    let ctx = ExecutionContext::new(run_id, self.store.clone(), workflow);
    let mut node_reports = Vec::with_capacity(total);

    for batch in &batches {
      if cancel.is_cancelled() {
        warn!(run_id = %run_id, "run cancelled");
        return Err(RuntimeError::Cancelled);
      }

      let mut steps = pin!(
        futures::stream::iter(batch.iter().map(|node_id| self.step(&ctx, node_id))).buffered(limit)
      );

      loop {
        let next = tokio::select! {
          next = steps.next() => next,
          _ = cancel.cancelled() => {
            warn!(run_id = %run_id, "run cancelled during node execution");
            self.clear_running(batch).await;
            return Err(RuntimeError::Cancelled);
          }
        };
        let Some(report) = next else {
          break;
        };

        node_reports.push(report);
        self
          .publish_progress(run_id, step_progress(node_reports.len(), total))
          .await;

        if self.config.failure_policy == FailurePolicy::Halt {
          if let Some(NodeReport {
            node_id,
            status: NodeStatus::Failed { error },
            ..
          }) = node_reports.last()
          {
            warn!(run_id = %run_id, node_id = %node_id, "halting run after node failure");
            self.clear_running(batch).await;
            return Err(RuntimeError::NodeFailed {
              node_id: node_id.clone(),
              message: error.clone(),
            });
          }
        }
      }
    }

    Ok(RunResult {
      run_id: run_id.to_string(),
      order,
      node_reports,
    })
  }

  /// Run one scheduled node and report how it ended.
  async fn step(&self, ctx: &ExecutionContext, node_id: &str) -> NodeReport {
    let run_id = ctx.run_id.clone();

    let Some(node) = self.store.node(node_id).await else {
      warn!(run_id = %run_id, node_id = %node_id, "scheduled node missing from store");
      let node_type = ctx
        .workflow
        .get_node(node_id)
        .map(|n| n.node_type.clone())
        .unwrap_or_else(|| "unknown".into());
      return NodeReport {
        node_id: node_id.to_string(),
        node_type,
        status: NodeStatus::Skipped,
      };
    };

    let Some(executor) = self.registry.get(&node.node_type) else {
      debug!(run_id = %run_id, node_id = %node_id, node_type = %node.node_type, "node_skipped");
      self.notifier.notify(ExecutionEvent::NodeSkipped {
        run_id,
        node_id: node_id.to_string(),
        node_type: node.node_type.to_string(),
      });
      return NodeReport {
        node_id: node_id.to_string(),
        node_type: node.node_type,
        status: NodeStatus::Skipped,
      };
    };

    info!(run_id = %run_id, node_id = %node_id, node_type = %node.node_type, "node_started");
    self.notifier.notify(ExecutionEvent::NodeStarted {
      run_id: run_id.clone(),
      node_id: node_id.to_string(),
    });

    let status = match executor.execute(ctx, &node).await {
      Ok(output) => {
        info!(run_id = %run_id, node_id = %node_id, "node_completed");
        self.notifier.notify(ExecutionEvent::NodeCompleted {
          run_id,
          node_id: node_id.to_string(),
          output,
        });
        NodeStatus::Succeeded
      }
      Err(e) => {
        error!(run_id = %run_id, node_id = %node_id, error = %e, "node_failed");
        self.record_failure(node_id, &e).await;
        self.notifier.notify(ExecutionEvent::NodeFailed {
          run_id,
          node_id: node_id.to_string(),
          error: e.to_string(),
        });
        NodeStatus::Failed {
          error: e.to_string(),
        }
      }
    };

    NodeReport {
      node_id: node_id.to_string(),
      node_type: node.node_type,
      status,
    }
  }

  /// Leave a failed node idle, with its error set and no stale output.
  async fn record_failure(&self, node_id: &str, error: &ExecutionError) {
    let patch = NodeDataPatch::new()
      .running(false)
      .error(error.to_string())
      .clear_output();
    if let Err(e) = self.store.update_node_data(node_id, patch).await {
      warn!(node_id = %node_id, error = %e, "failed to record node failure");
    }
  }

  /// Clear `running` on nodes whose execution was abandoned.
  async fn clear_running(&self, node_ids: &[String]) {
    for node_id in node_ids {
      if let Err(e) = self
        .store
        .update_node_data(node_id, NodeDataPatch::new().running(false))
        .await
      {
        warn!(node_id = %node_id, error = %e, "failed to clear running flag");
      }
    }
  }

  async fn publish_progress(&self, run_id: &str, progress: f64) {
    self.store.set_progress(progress).await;
    self.notifier.notify(ExecutionEvent::ProgressChanged {
      run_id: run_id.to_string(),
      progress,
    });
  }
}

fn graph_error(e: WorkflowError) -> RuntimeError {
  match e {
    WorkflowError::CycleDetected { nodes } => RuntimeError::CycleDetected { nodes },
  }
}
