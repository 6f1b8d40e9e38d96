//! Nodechain Runtime
//!
//! This crate provides the run engine for nodechain. It turns the graph held
//! in a [`GraphStore`](nodechain_store::GraphStore) into an execution order,
//! runs each node through the executor registered for its type, and
//! publishes progress as it goes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Runtime                            │
//! │  - run(cancel) → RunResult                                  │
//! │  - snapshot, schedule, progress, run-start/run-end notices  │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ExecutorRegistry                        │
//! │  - NodeType → NodeExecutor                                  │
//! │  - prompt_node, chain_node, txt_to_img built in             │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │             NodeExecutor (per node, per type)               │
//! │  - gathers upstream text, calls the ComputeService,         │
//! │    writes output back to the GraphStore                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let store = Arc::new(InMemoryGraphStore::new(graph));
//! let compute = Arc::new(HttpComputeService::new(ComputeConfig::new(url, user_id))?);
//! let registry = ExecutorRegistry::with_defaults(compute.clone(), BlobRegistry::new());
//!
//! let runtime = Runtime::new(store, compute, registry, RuntimeConfig::default());
//! let result = runtime.run(CancellationToken::new()).await?;
//! ```

mod blob;
mod chain;
mod error;
mod events;
mod executor;
mod image;
mod input;
mod progress;
mod prompt;
mod result;
mod runtime;

pub use blob::BlobRegistry;
pub use chain::ChainNodeExecutor;
pub use error::{ExecutionError, RuntimeError};
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier};
pub use executor::{ExecutionContext, ExecutorRegistry, NodeExecutor};
pub use image::TextToImageExecutor;
pub use input::{EdgeRoles, UpstreamText, compose_prompt, gather_upstream};
pub use progress::{IDLE_PROGRESS, started_progress, step_progress};
pub use prompt::PromptNodeExecutor;
pub use result::{NodeReport, NodeStatus, RunResult};
pub use runtime::{ExecutionMode, FailurePolicy, Runtime, RuntimeConfig};
