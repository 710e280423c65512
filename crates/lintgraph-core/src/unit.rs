//! Analysis unit: the atomic, cached, schedulable item (one per component).

use serde::{Deserialize, Serialize};

use crate::function::FunctionInfo;

/// Separator used to join member ids of a multi-member unit.
pub const UNIT_ID_SEPARATOR: &str = "+";

/// One strongly connected component of the call graph, ready for analysis.
///
/// Units are built once by the unit builder and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisUnit {
    /// Deterministic id derived from the sorted member ids.
    pub id: String,
    /// Member functions, sorted by id.
    pub members: Vec<FunctionInfo>,
    /// Sorted ids of the units this unit calls into. Never contains `id`.
    pub dependencies: Vec<String>,
    /// Sorted ids of external callees for which metadata is known.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_callees: Vec<String>,
}

impl AnalysisUnit {
    /// Derive a unit id from member node ids.
    ///
    /// A single member keeps its bare id; several members are sorted and
    /// joined with [`UNIT_ID_SEPARATOR`].
    pub fn id_for<S: AsRef<str>>(member_ids: &[S]) -> String {
        let mut ids: Vec<&str> = member_ids.iter().map(AsRef::as_ref).collect();
        ids.sort_unstable();
        ids.join(UNIT_ID_SEPARATOR)
    }

    /// Look up a member by its short name or its full node id.
    pub fn member(&self, name: &str) -> Option<&FunctionInfo> {
        self.members
            .iter()
            .find(|f| f.id == name)
            .or_else(|| self.members.iter().find(|f| f.name == name))
    }

    /// Returns `true` if the unit is a single non-recursive-group function.
    pub fn is_single(&self) -> bool {
        self.members.len() == 1
    }
}
