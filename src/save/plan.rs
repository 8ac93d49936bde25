use crate::graph::{CourseGraph, LocalToken};

/// The create call a pending phase translates into.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSpec {
    pub token: LocalToken,
    pub name: String,
    pub phase_type_id: String,
    pub is_initial: bool,
}

/// The remote operations a save will perform, in execution order.
///
/// Recomputed from the model at the start of every save run, so a retry after
/// a partial failure only plans the operations that are still outstanding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavePlan {
    /// Phases to delete, by persisted identifier.
    pub deletions: Vec<String>,
    /// Phases to create, in placeholder-creation order.
    pub creations: Vec<CreateSpec>,
    /// `(persisted id, new name)` rename calls.
    pub renames: Vec<(String, String)>,
    /// Whether the three graph replacements will be pushed.
    pub push_graphs: bool,
}

impl SavePlan {
    /// Diffs the current snapshot against the persisted one.
    pub fn compute(graph: &CourseGraph) -> Self {
        if !graph.is_modified() {
            return Self::default();
        }
        Self {
            deletions: graph.removed_phase_ids(),
            creations: graph
                .pending_phases()
                .into_iter()
                .map(|(token, phase)| CreateSpec {
                    token,
                    name: phase.name.clone(),
                    phase_type_id: phase.phase_type.id.clone(),
                    is_initial: phase.is_initial,
                })
                .collect(),
            renames: graph.renamed_phases(),
            push_graphs: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.push_graphs
            && self.deletions.is_empty()
            && self.creations.is_empty()
            && self.renames.is_empty()
    }
}
