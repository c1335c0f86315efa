// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
//! Dependency resolution over the controllable graph.
//!
//! An edge `A -> B` means A outputs into one of B's inputs. The resolved order
//! lists B before A, so walking it in reverse mixes every producer before the
//! nodes it feeds.

use petgraph::algo::{has_path_connecting, is_cyclic_directed, toposort};
use petgraph::graphmap::{DiGraphMap, NodeTrait};

use crate::error::GraphError;

pub mod arena;

/// Builds the dependency graph of `nodes`. `successors` returns the nodes a
/// node outputs into; successors that are not part of `nodes` are dropped.
pub fn dependency_graph<K, I, F>(nodes: I, mut successors: F) -> DiGraphMap<K, ()>
where
    K: NodeTrait,
    I: IntoIterator<Item = K>,
    F: FnMut(K) -> Vec<K>,
{
    let mut graph = DiGraphMap::new();
    for node in nodes {
        graph.add_node(node);
    }
    let known: Vec<K> = graph.nodes().collect();
    for node in known {
        for successor in successors(node) {
            if graph.contains_node(successor) {
                graph.add_edge(node, successor, ());
            }
        }
    }
    graph
}

/// Sorts the graph so that for every edge `A -> B`, B comes before A. Fails
/// with [`GraphError::Cycle`] if the graph has a cycle.
pub fn topological_sort<K: NodeTrait>(graph: &DiGraphMap<K, ()>) -> Result<Vec<K>, GraphError> {
    let mut order = toposort(graph, None).map_err(|_| GraphError::Cycle)?;
    order.reverse();
    Ok(order)
}

pub fn has_cycle<K: NodeTrait>(graph: &DiGraphMap<K, ()>) -> bool {
    is_cyclic_directed(graph)
}

/// Returns true if adding the edge `from -> to` would close a cycle, i.e. if
/// `from` is already reachable from `to`.
pub fn would_create_cycle<K: NodeTrait>(graph: &DiGraphMap<K, ()>, from: K, to: K) -> bool {
    if from == to {
        return true;
    }
    graph.contains_node(from)
        && graph.contains_node(to)
        && has_path_connecting(graph, to, from, None)
}
