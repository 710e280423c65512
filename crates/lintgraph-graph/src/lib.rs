//! Call graph condensation for lintgraph.
//!
//! Turns the raw call graph from extraction into an ordered batch of
//! analysis units:
//!
//! - [`call_graph`]: the internal call graph, restricted to defined functions
//! - [`condense`]: strongly connected components in leaves-first order
//! - [`units`]: one immutable [`AnalysisUnit`] per component
//! - [`unit_graph`]: the unit-level DAG and its dependency layers

pub mod call_graph;
pub mod condense;
pub mod error;
pub mod unit_graph;
pub mod units;

use lintgraph_core::extraction::Extraction;
use lintgraph_core::unit::AnalysisUnit;

pub use error::GraphError;

/// Build the ordered analysis units for an extraction document.
///
/// Units come back in dependency order: every unit appears after all of the
/// units it depends on.
pub fn plan_units(extraction: &Extraction) -> Result<Vec<AnalysisUnit>, GraphError> {
    let internal = call_graph::InternalGraph::from_extraction(extraction)?;
    let components = condense::condense(&internal.graph)?;
    units::build_units(&components, &internal)
}
