//! The internal call graph.
//!
//! Nodes and callee sets are kept in ordered collections so every traversal
//! visits nodes, and each node's edges, in lexicographic order regardless of
//! the order the extraction document listed them in.

use std::collections::{BTreeMap, BTreeSet};

use lintgraph_core::extraction::Extraction;
use lintgraph_core::function::FunctionInfo;

use crate::error::GraphError;

/// Directed graph of node ids. Duplicate edges collapse; self-loops are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a node. Declaring an existing node is a no-op.
    pub fn add_node(&mut self, id: impl Into<String>) {
        self.edges.entry(id.into()).or_default();
    }

    /// Add an edge `from -> to`, declaring `from` if needed.
    ///
    /// `to` is not declared implicitly; [`CallGraph::validate`] reports edges
    /// to undeclared nodes.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.edges.entry(from.into()).or_default().insert(to.into());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.edges.contains_key(id)
    }

    /// All nodes in sorted order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// Callees of `id` in sorted order. Empty for unknown nodes.
    pub fn callees(&self, id: &str) -> impl Iterator<Item = &str> {
        self.edges
            .get(id)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Check that every edge points at a declared node.
    pub fn validate(&self) -> Result<(), GraphError> {
        for (from, callees) in &self.edges {
            if let Some(to) = callees.iter().find(|to| !self.edges.contains_key(*to)) {
                return Err(GraphError::UnknownNode {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
        }
        Ok(())
    }
}

/// The extraction document reduced to what the condenser and unit builder
/// need: the graph over defined functions, their sources, and the external
/// callees each function reaches.
#[derive(Debug, Clone, Default)]
pub struct InternalGraph {
    pub graph: CallGraph,
    pub sources: BTreeMap<String, FunctionInfo>,
    /// Caller id -> sorted ids of non-internal callees with known metadata.
    pub external_callees: BTreeMap<String, BTreeSet<String>>,
}

impl InternalGraph {
    /// Restrict the raw call graph to internally defined functions.
    ///
    /// Callers that are not defined are dropped. Callees that are not defined
    /// are removed from the graph; those with extraction metadata are kept
    /// per caller as external callees, the rest are discarded.
    pub fn from_extraction(extraction: &Extraction) -> Result<Self, GraphError> {
        let mut graph = CallGraph::new();
        let mut sources = BTreeMap::new();
        for func in &extraction.functions {
            if sources.contains_key(&func.id) {
                return Err(GraphError::DuplicateNode {
                    id: func.id.clone(),
                });
            }
            graph.add_node(func.id.clone());
            sources.insert(func.id.clone(), func.clone());
        }

        let mut external_callees: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (caller, callees) in &extraction.graph {
            if !sources.contains_key(caller) {
                tracing::debug!("Dropping edges from undefined caller {caller}");
                continue;
            }
            for callee in callees {
                if sources.contains_key(callee) {
                    graph.add_edge(caller.clone(), callee.clone());
                } else if extraction.externals.contains_key(callee) {
                    external_callees
                        .entry(caller.clone())
                        .or_default()
                        .insert(callee.clone());
                } else {
                    tracing::debug!("Ignoring unresolved callee {callee} of {caller}");
                }
            }
        }

        Ok(Self {
            graph,
            sources,
            external_callees,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_edges_collapse() {
        let mut g = CallGraph::new();
        g.add_node("b");
        g.add_edge("a", "b");
        g.add_edge("a", "b");
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.callees("a").collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn nodes_are_sorted() {
        let mut g = CallGraph::new();
        for id in ["c", "a", "b"] {
            g.add_node(id);
        }
        assert_eq!(g.nodes().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn validate_reports_unknown_callee() {
        let mut g = CallGraph::new();
        g.add_edge("a", "ghost");
        assert_eq!(
            g.validate(),
            Err(GraphError::UnknownNode {
                from: "a".into(),
                to: "ghost".into()
            })
        );
    }

    #[test]
    fn callees_of_unknown_node_is_empty() {
        let g = CallGraph::new();
        assert_eq!(g.callees("nope").count(), 0);
    }
}
