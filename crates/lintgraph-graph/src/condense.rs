//! Strongly connected component discovery.
//!
//! Tarjan's algorithm with an explicit call stack so very deep call chains
//! cannot overflow the thread stack. Nodes are visited in sorted order and
//! each node's callees in sorted order; components are emitted callees first
//! (leaves-first over the condensed DAG) with their members sorted.

use std::collections::HashMap;

use crate::call_graph::CallGraph;
use crate::error::GraphError;

const UNVISITED: usize = usize::MAX;

/// A maximal set of mutually reachable nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Member node ids, sorted.
    pub members: Vec<String>,
}

impl Component {
    pub fn contains(&self, id: &str) -> bool {
        self.members.binary_search_by(|m| m.as_str().cmp(id)).is_ok()
    }
}

/// Condense `graph` into its strongly connected components.
///
/// For every edge `u -> v` crossing components, the component of `v` comes
/// before the component of `u` in the returned list. A malformed graph is
/// rejected before any component is produced.
pub fn condense(graph: &CallGraph) -> Result<Vec<Component>, GraphError> {
    graph.validate()?;

    let nodes: Vec<&str> = graph.nodes().collect();
    let position: HashMap<&str, usize> = nodes.iter().enumerate().map(|(i, n)| (*n, i)).collect();
    let adjacency: Vec<Vec<usize>> = nodes
        .iter()
        .map(|n| {
            graph
                .callees(n)
                .filter_map(|c| position.get(c).copied())
                .collect()
        })
        .collect();

    let count = nodes.len();
    let mut index = vec![UNVISITED; count];
    let mut lowlink = vec![0usize; count];
    let mut on_stack = vec![false; count];
    let mut stack: Vec<usize> = Vec::new();
    // (node, next edge to explore)
    let mut call: Vec<(usize, usize)> = Vec::new();
    let mut next_index = 0usize;
    let mut components = Vec::new();

    for root in 0..count {
        if index[root] != UNVISITED {
            continue;
        }

        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        call.push((root, 0));

        while let Some(&(v, edge)) = call.last() {
            if let Some(&w) = adjacency[v].get(edge) {
                let top = call.len() - 1;
                call[top].1 += 1;

                if index[w] == UNVISITED {
                    index[w] = next_index;
                    lowlink[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    call.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
                continue;
            }

            call.pop();
            if let Some(&(parent, _)) = call.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }

            if lowlink[v] == index[v] {
                let mut members = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    members.push(nodes[w].to_string());
                    if w == v {
                        break;
                    }
                }
                members.sort();
                components.push(Component { members });
            }
        }
    }

    tracing::debug!(
        "Condensed {} nodes into {} components",
        count,
        components.len()
    );
    Ok(components)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &str)]) -> CallGraph {
        let mut g = CallGraph::new();
        for (from, to) in edges {
            g.add_node(*from);
            g.add_node(*to);
        }
        for (from, to) in edges {
            g.add_edge(*from, *to);
        }
        g
    }

    fn members(components: &[Component]) -> Vec<Vec<&str>> {
        components
            .iter()
            .map(|c| c.members.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn empty_graph_has_no_components() {
        assert!(condense(&CallGraph::new()).unwrap().is_empty());
    }

    #[test]
    fn self_loop_is_singleton() {
        let g = graph(&[("a", "a"), ("b", "a")]);
        assert_eq!(members(&condense(&g).unwrap()), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn two_cycles_joined_by_an_edge() {
        let g = graph(&[("a", "b"), ("b", "a"), ("b", "c"), ("c", "d"), ("d", "c")]);
        assert_eq!(
            members(&condense(&g).unwrap()),
            vec![vec!["c", "d"], vec!["a", "b"]]
        );
    }

    #[test]
    fn unknown_node_fails_before_output() {
        let mut g = CallGraph::new();
        g.add_node("a");
        g.add_edge("a", "missing");
        assert!(matches!(
            condense(&g),
            Err(GraphError::UnknownNode { .. })
        ));
    }

    #[test]
    fn long_chain_does_not_overflow() {
        let mut g = CallGraph::new();
        let n = 100_000;
        for i in 0..n {
            g.add_node(format!("f{i:06}"));
        }
        for i in 0..n - 1 {
            g.add_edge(format!("f{i:06}"), format!("f{:06}", i + 1));
        }
        let components = condense(&g).unwrap();
        assert_eq!(components.len(), n);
        assert_eq!(components[0].members, vec![format!("f{:06}", n - 1)]);
    }

    #[test]
    fn component_contains() {
        let c = Component {
            members: vec!["a".into(), "c".into()],
        };
        assert!(c.contains("c"));
        assert!(!c.contains("b"));
    }
}
