//! Nodechain Workflow
//!
//! This crate provides the snapshot of a canvas graph taken at run start,
//! and the pure graph algorithms the run engine needs from it:
//!
//! - [`Graph`] materializes adjacency lists and in-degrees
//! - [`topological_order`] produces the execution order (Kahn's algorithm,
//!   ready nodes picked by smallest x-position, then collection order)
//! - [`try_topological_order`] and [`wavefronts`] do the same but report
//!   cycles as [`WorkflowError::CycleDetected`]
//!
//! Nothing here touches the graph store.

mod error;
mod graph;
mod schedule;
mod workflow;

pub use error::WorkflowError;
pub use graph::Graph;
pub use schedule::{topological_order, try_topological_order, wavefronts};
pub use workflow::Workflow;
