//! Nodechain Config
//!
//! This crate contains the serializable graph document types for nodechain.
//! These types represent a canvas graph (nodes and edges) as the canvas
//! exports it, before a snapshot is taken for execution.
//!
//! Documents can be loaded from:
//! - JSON template files (via CLI with `nodechain run graph.json`)
//! - The in-memory graph store backing a canvas session
//!
//! The run engine snapshots these types at run start and never creates or
//! destroys nodes; it only writes node data fields back.

mod edge;
mod graph;
mod node;
mod output;

pub use edge::{Edge, INPUT_HANDLE};
pub use graph::GraphDef;
pub use node::{Node, NodeData, NodeType, Position};
pub use output::{ImageHandle, NodeOutput};
