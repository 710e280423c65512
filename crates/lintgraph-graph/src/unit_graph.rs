//! Unit-level dependency graph for scheduling.
//!
//! Models the ordering constraints between analysis units: a unit can only
//! be analyzed after every unit it calls into. Uses `petgraph` for the
//! topological walk that assigns each unit a dependency layer.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Topo;
use petgraph::Direction;
use std::collections::HashMap;

use lintgraph_core::unit::AnalysisUnit;

/// A scheduling graph over analysis units. Edges point from a dependency to
/// its dependent.
pub struct UnitGraph<'a> {
    graph: DiGraph<String, ()>,
    indices: HashMap<String, NodeIndex>,
    units: HashMap<String, &'a AnalysisUnit>,
    /// Position of each unit in the order it was added.
    position: HashMap<String, usize>,
}

impl<'a> UnitGraph<'a> {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            indices: HashMap::new(),
            units: HashMap::new(),
            position: HashMap::new(),
        }
    }

    /// Build the graph for an ordered unit list, wiring every dependency edge.
    pub fn from_units(units: &'a [AnalysisUnit]) -> Self {
        let mut graph = Self::new();
        for unit in units {
            graph.add_unit(unit);
        }
        for unit in units {
            for dep in &unit.dependencies {
                graph.add_dependency(dep, &unit.id);
            }
        }
        graph
    }

    /// Add an analysis unit to the graph.
    pub fn add_unit(&mut self, unit: &'a AnalysisUnit) {
        let idx = self.graph.add_node(unit.id.clone());
        self.position.insert(unit.id.clone(), self.position.len());
        self.indices.insert(unit.id.clone(), idx);
        self.units.insert(unit.id.clone(), unit);
    }

    /// Declare that `dependent` depends on `dependency` (must be analyzed after).
    pub fn add_dependency(&mut self, dependency: &str, dependent: &str) {
        if let (Some(&from), Some(&to)) =
            (self.indices.get(dependency), self.indices.get(dependent))
        {
            self.graph.add_edge(from, to, ());
        }
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Group units into dependency layers.
    ///
    /// A unit with no dependencies is in layer 0; any other unit is one layer
    /// above its deepest dependency, so no unit shares a layer with something
    /// it depends on. Units within a layer keep the order they were added in.
    pub fn layers(&self) -> Vec<Vec<&'a AnalysisUnit>> {
        let mut depth: HashMap<NodeIndex, usize> = HashMap::new();
        let mut topo = Topo::new(&self.graph);
        while let Some(idx) = topo.next(&self.graph) {
            let layer = self
                .graph
                .neighbors_directed(idx, Direction::Incoming)
                .filter_map(|dep| depth.get(&dep))
                .map(|d| d + 1)
                .max()
                .unwrap_or(0);
            depth.insert(idx, layer);
        }

        let height = depth.values().max().map_or(0, |d| d + 1);
        let mut layers: Vec<Vec<&'a AnalysisUnit>> = vec![Vec::new(); height];
        for (idx, layer) in depth {
            if let Some(unit) = self.units.get(&self.graph[idx]) {
                layers[layer].push(*unit);
            }
        }
        for layer in &mut layers {
            layer.sort_by_key(|u| self.position.get(&u.id).copied().unwrap_or(usize::MAX));
        }
        layers
    }
}

impl Default for UnitGraph<'_> {
    fn default() -> Self {
        Self::new()
    }
}
