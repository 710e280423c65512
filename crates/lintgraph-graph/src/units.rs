//! Analysis unit construction from condensed components.

use std::collections::{BTreeSet, HashMap};

use lintgraph_core::unit::AnalysisUnit;

use crate::call_graph::InternalGraph;
use crate::condense::Component;
use crate::error::GraphError;

/// Build one [`AnalysisUnit`] per component, preserving component order.
///
/// Dependencies are the de-duplicated, sorted ids of the units reached by
/// member edges that leave the component. Edges back into the same unit and
/// edges to nodes that are not internal are skipped.
pub fn build_units(
    components: &[Component],
    internal: &InternalGraph,
) -> Result<Vec<AnalysisUnit>, GraphError> {
    let unit_ids: Vec<String> = components
        .iter()
        .map(|c| AnalysisUnit::id_for(&c.members))
        .collect();

    let mut owner: HashMap<&str, usize> = HashMap::new();
    for (i, component) in components.iter().enumerate() {
        for member in &component.members {
            owner.insert(member.as_str(), i);
        }
    }

    let mut units = Vec::with_capacity(components.len());
    for (i, component) in components.iter().enumerate() {
        let mut members = Vec::with_capacity(component.members.len());
        let mut dependencies = BTreeSet::new();
        let mut externals = BTreeSet::new();

        for id in &component.members {
            let source = internal
                .sources
                .get(id)
                .ok_or_else(|| GraphError::MissingSource { id: id.clone() })?;
            members.push(source.clone());

            for callee in internal.graph.callees(id) {
                match owner.get(callee) {
                    Some(&target) if target != i => {
                        dependencies.insert(unit_ids[target].clone());
                    }
                    Some(_) => {}
                    None => tracing::debug!("Skipping edge {id} -> {callee} to unknown node"),
                }
            }

            if let Some(ext) = internal.external_callees.get(id) {
                externals.extend(ext.iter().cloned());
            }
        }

        units.push(AnalysisUnit {
            id: unit_ids[i].clone(),
            members,
            dependencies: dependencies.into_iter().collect(),
            external_callees: externals.into_iter().collect(),
        });
    }

    Ok(units)
}
