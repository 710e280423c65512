//! Units command implementation.

use std::path::Path;

use miette::Result;

use lintgraph_core::extraction::Extraction;
use lintgraph_util::progress::status_info;

/// Print every unit in processing order, one per line, with its dependencies.
pub fn exec(input: &Path) -> Result<()> {
    let extraction = Extraction::from_path(input)?;
    let units = lintgraph_graph::plan_units(&extraction)?;

    for unit in &units {
        if unit.dependencies.is_empty() {
            println!("{}", unit.id);
        } else {
            println!("{} -> {}", unit.id, unit.dependencies.join(", "));
        }
    }

    let cyclic = units.iter().filter(|u| !u.is_single()).count();
    status_info(
        "Planned",
        &format!(
            "{} unit(s) from {} function(s), {cyclic} cyclic",
            units.len(),
            extraction.functions.len()
        ),
    );
    Ok(())
}
