//! Topological scheduling with a positional tie-break.
//!
//! Among nodes that are ready at the same time, the one furthest left on the
//! canvas (smallest `x`) runs first. Equal `x` falls back to the order the
//! nodes appear in the collection, so the result is fully deterministic.

use std::cmp::Ordering;
use std::collections::HashMap;

use nodechain_config::{Edge, Node};

use crate::error::WorkflowError;
use crate::graph::Graph;

/// Execution order for `nodes`.
///
/// Every edge `u -> v` places `u` before `v`. Nodes on a cycle never become
/// ready and are left out of the result without any diagnostic; use
/// [`try_topological_order`] to have them reported.
pub fn topological_order(nodes: &[Node], edges: &[Edge]) -> Vec<String> {
  kahn(nodes, edges).0
}

/// Like [`topological_order`], but fails if any node was left out.
pub fn try_topological_order(nodes: &[Node], edges: &[Edge]) -> Result<Vec<String>, WorkflowError> {
  let (order, graph) = kahn(nodes, edges);
  check_complete(&graph, order.len(), |id| order.iter().any(|o| o == id))?;
  Ok(order)
}

/// Group the execution order into wavefronts.
///
/// A wavefront holds every node whose predecessors all sit in earlier
/// wavefronts. Within a wavefront nodes are ordered by the same tie-break as
/// [`topological_order`].
pub fn wavefronts(nodes: &[Node], edges: &[Edge]) -> Result<Vec<Vec<String>>, WorkflowError> {
  let graph = Graph::new(nodes, edges);
  let mut in_degree = graph.in_degrees().clone();

  let mut current: Vec<usize> = ready_indices(&graph, &in_degree);
  sort_ready(&mut current, nodes);

  let mut waves = Vec::new();
  let mut scheduled = 0;

  while !current.is_empty() {
    let mut next = Vec::new();
    for &idx in &current {
      release_downstream(&graph, &nodes[idx].id, &mut in_degree, &mut next);
    }
    scheduled += current.len();
    waves.push(current.iter().map(|&idx| nodes[idx].id.clone()).collect::<Vec<_>>());

    sort_ready(&mut next, nodes);
    current = next;
  }

  check_complete(&graph, scheduled, |id| {
    waves.iter().any(|wave| wave.iter().any(|w| w == id))
  })?;
  Ok(waves)
}

fn kahn(nodes: &[Node], edges: &[Edge]) -> (Vec<String>, Graph) {
  let graph = Graph::new(nodes, edges);
  let mut in_degree = graph.in_degrees().clone();
  let mut ready = ready_indices(&graph, &in_degree);
  let mut order = Vec::with_capacity(nodes.len());

  while let Some(pos) = next_ready(&ready, nodes) {
    let idx = ready.swap_remove(pos);
    let node_id = &nodes[idx].id;
    order.push(node_id.clone());
    release_downstream(&graph, node_id, &mut in_degree, &mut ready);
  }

  (order, graph)
}

/// Indices of nodes whose in-degree is zero, in collection order.
fn ready_indices(graph: &Graph, in_degree: &HashMap<String, usize>) -> Vec<usize> {
  graph
    .node_ids()
    .iter()
    .enumerate()
    .filter(|(_, id)| in_degree.get(*id).copied() == Some(0))
    .map(|(idx, _)| idx)
    .collect()
}

/// Decrement the in-degree of every successor, collecting newly ready ones.
fn release_downstream(
  graph: &Graph,
  node_id: &str,
  in_degree: &mut HashMap<String, usize>,
  ready: &mut Vec<usize>,
) {
  for next in graph.downstream(node_id) {
    let Some(degree) = in_degree.get_mut(next) else {
      continue;
    };
    *degree = degree.saturating_sub(1);
    if *degree == 0 {
      if let Some(idx) = graph.index_of(next) {
        ready.push(idx);
      }
    }
  }
}

fn compare_ready(nodes: &[Node], a: usize, b: usize) -> Ordering {
  nodes[a]
    .position
    .x
    .total_cmp(&nodes[b].position.x)
    .then(a.cmp(&b))
}

/// Position in `ready` of the node to run next.
fn next_ready(ready: &[usize], nodes: &[Node]) -> Option<usize> {
  ready
    .iter()
    .enumerate()
    .min_by(|(_, a), (_, b)| compare_ready(nodes, **a, **b))
    .map(|(pos, _)| pos)
}

fn sort_ready(ready: &mut [usize], nodes: &[Node]) {
  ready.sort_by(|a, b| compare_ready(nodes, *a, *b));
}

fn check_complete(
  graph: &Graph,
  scheduled: usize,
  is_scheduled: impl Fn(&str) -> bool,
) -> Result<(), WorkflowError> {
  if scheduled == graph.node_ids().len() {
    return Ok(());
  }

  let nodes = graph
    .node_ids()
    .iter()
    .filter(|id| !is_scheduled(id))
    .cloned()
    .collect();
  Err(WorkflowError::CycleDetected { nodes })
}

#[cfg(test)]
mod tests {
  use super::*;
  use nodechain_config::{NodeType, Position};

  fn node(id: &str, x: f64) -> Node {
    Node::new(id, NodeType::PromptNode, Position::new(x, 0.0))
  }

  fn edge(from: &str, to: &str) -> Edge {
    Edge::new(format!("{}-{}", from, to), from, to)
  }

  fn assert_respects_edges(order: &[String], edges: &[Edge]) {
    let position = |id: &str| order.iter().position(|o| o == id).unwrap();
    for e in edges {
      assert!(
        position(&e.source) < position(&e.target),
        "{} should run before {} in {:?}",
        e.source,
        e.target,
        order
      );
    }
  }

  #[test]
  fn test_ready_nodes_by_x() {
    let nodes = [node("right", 30.0), node("left", 10.0), node("middle", 20.0)];

    assert_eq!(
      topological_order(&nodes, &[]),
      vec!["left", "middle", "right"]
    );
  }

  #[test]
  fn test_equal_x_keeps_collection_order() {
    let nodes = [node("a", 0.0), node("b", 0.0), node("c", 0.0)];

    assert_eq!(topological_order(&nodes, &[]), vec!["a", "b", "c"]);
  }

  #[test]
  fn test_diamond() {
    let nodes = [
      node("d", 0.0),
      node("c", 50.0),
      node("b", 100.0),
      node("a", 200.0),
    ];
    let edges = [edge("a", "b"), edge("a", "c"), edge("b", "d"), edge("c", "d")];

    let order = topological_order(&nodes, &edges);
    assert_eq!(order, vec!["a", "c", "b", "d"]);
    assert_respects_edges(&order, &edges);
  }

  #[test]
  fn test_newly_ready_node_competes_by_x() {
    // "b" becomes ready after "a" and sits left of "c", so it jumps ahead.
    let nodes = [node("a", 0.0), node("c", 50.0), node("b", 10.0)];
    let edges = [edge("a", "b")];

    assert_eq!(topological_order(&nodes, &edges), vec!["a", "b", "c"]);
  }

  #[test]
  fn test_generated_dags_respect_edges() {
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = || {
      seed ^= seed << 13;
      seed ^= seed >> 7;
      seed ^= seed << 17;
      seed
    };

    for _ in 0..50 {
      let count = (next() % 12 + 1) as usize;
      let nodes: Vec<Node> = (0..count)
        .map(|i| node(&format!("n{}", i), (next() % 5) as f64))
        .collect();

      // Only forward edges (lower index -> higher index) keep it acyclic.
      let mut edges = Vec::new();
      for i in 0..count {
        for j in (i + 1)..count {
          if next() % 3 == 0 {
            edges.push(edge(&nodes[i].id, &nodes[j].id));
          }
        }
      }

      let order = topological_order(&nodes, &edges);
      assert_eq!(order.len(), count);
      assert_respects_edges(&order, &edges);
      assert_eq!(try_topological_order(&nodes, &edges).unwrap(), order);
    }
  }

  #[test]
  fn test_two_node_cycle_is_omitted() {
    let nodes = [node("a", 0.0), node("b", 10.0)];
    let edges = [edge("a", "b"), edge("b", "a")];

    assert!(topological_order(&nodes, &edges).is_empty());
  }

  #[test]
  fn test_cycle_reported() {
    let nodes = [node("root", 0.0), node("a", 10.0), node("b", 20.0)];
    let edges = [edge("root", "a"), edge("a", "b"), edge("b", "a")];

    assert_eq!(topological_order(&nodes, &edges), vec!["root"]);
    match try_topological_order(&nodes, &edges) {
      Err(WorkflowError::CycleDetected { nodes }) => assert_eq!(nodes, vec!["a", "b"]),
      other => panic!("expected CycleDetected, got {:?}", other),
    }
    assert!(matches!(
      wavefronts(&nodes, &edges),
      Err(WorkflowError::CycleDetected { .. })
    ));
  }

  #[test]
  fn test_wavefronts_diamond() {
    let nodes = [
      node("a", 0.0),
      node("c", 100.0),
      node("b", 50.0),
      node("d", 200.0),
      node("lone", 75.0),
    ];
    let edges = [edge("a", "b"), edge("a", "c"), edge("b", "d"), edge("c", "d")];

    let waves = wavefronts(&nodes, &edges).unwrap();
    assert_eq!(
      waves,
      vec![vec!["a", "lone"], vec!["b", "c"], vec!["d"]]
    );
  }

  #[test]
  fn test_empty_graph() {
    assert!(topological_order(&[], &[]).is_empty());
    assert!(wavefronts(&[], &[]).unwrap().is_empty());
  }
}
