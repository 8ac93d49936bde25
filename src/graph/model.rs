use crate::catalog::{DataFlowKind, PhaseType};
use crate::error::{EditError, StoreError};
use crate::graph::phase::{LocalToken, Phase, PhaseId, Position};
use crate::graph::snapshot::{DataFlowEdge, GraphSnapshot, StudentFlowEdge};
use crate::graph::validate;
use crate::store::PhaseStore;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use tracing::{debug, warn};

/// The editable course graph owned by one configurator session.
///
/// A `CourseGraph` holds two snapshots: the current, editable one and the
/// last-known-persisted one. Every mutation goes through a primitive on this
/// type; connect operations are gated by the structural validator and become
/// logged no-ops when rejected. The delta between the two snapshots drives the
/// save engine.
#[derive(Debug, Clone)]
pub struct CourseGraph {
    course_id: String,
    current: GraphSnapshot,
    persisted: GraphSnapshot,
    /// Persisted phases whose display name changed since the last save.
    renamed: AHashSet<PhaseId>,
    structurally_modified: bool,
    next_token: LocalToken,
}

impl CourseGraph {
    /// Creates an empty editable graph for a course with no persisted phases.
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            current: GraphSnapshot::default(),
            persisted: GraphSnapshot::default(),
            renamed: AHashSet::new(),
            structurally_modified: false,
            next_token: 0,
        }
    }

    /// Hydrates a session from the authoritative store state.
    pub async fn load<S>(store: &S, course_id: &str) -> Result<Self, StoreError>
    where
        S: PhaseStore + ?Sized,
    {
        let types = store.fetch_phase_types().await?;
        let types_by_id: AHashMap<&str, &PhaseType> =
            types.iter().map(|t| (t.id.as_str(), t)).collect();

        let mut snapshot = GraphSnapshot::default();
        for record in store.fetch_phases(course_id).await? {
            let phase_type = types_by_id.get(record.phase_type_id.as_str()).ok_or_else(|| {
                StoreError::Inconsistent(format!(
                    "phase '{}' references unknown phase type '{}'",
                    record.id, record.phase_type_id
                ))
            })?;
            snapshot.phases.push(Phase {
                id: PhaseId::Persisted(record.id),
                name: record.name,
                phase_type: (*phase_type).clone(),
                is_initial: record.is_initial,
                position: Position::default(),
            });
        }

        let flow = store.fetch_student_flow(course_id).await?;
        if let Some(initial) = &flow.initial_phase {
            if !snapshot.contains(&PhaseId::Persisted(initial.clone())) {
                return Err(StoreError::Inconsistent(format!(
                    "student-flow graph names unknown initial phase '{}'",
                    initial
                )));
            }
        }
        for edge in flow.edges {
            snapshot.student_flow.push(StudentFlowEdge {
                from: PhaseId::Persisted(edge.from),
                to: PhaseId::Persisted(edge.to),
            });
        }
        for kind in [DataFlowKind::PhaseData, DataFlowKind::ParticipationData] {
            for edge in store.fetch_data_flow(course_id, kind).await? {
                snapshot.data_flow.push(DataFlowEdge {
                    kind,
                    from: PhaseId::Persisted(edge.from),
                    from_connection: edge.from_connection,
                    to: PhaseId::Persisted(edge.to),
                    to_connection: edge.to_connection,
                });
            }
        }
        // The store is authoritative but not trusted blindly: a snapshot that
        // breaks the structural invariants must not hydrate into a session.
        if let Err(rejection) = validate::check_snapshot(&snapshot) {
            return Err(StoreError::Inconsistent(rejection.to_string()));
        }

        debug!(course = course_id, phases = snapshot.phases.len(), "hydrated course graph");
        Ok(Self {
            course_id: course_id.to_string(),
            persisted: snapshot.clone(),
            current: snapshot,
            renamed: AHashSet::new(),
            structurally_modified: false,
            next_token: 0,
        })
    }

    /// Reconstructs a session from two snapshots, deriving the modification
    /// flags by diffing them. Used when snapshots come from exported files
    /// rather than a live store.
    pub fn from_snapshots(
        course_id: impl Into<String>,
        current: GraphSnapshot,
        persisted: GraphSnapshot,
    ) -> Self {
        let renamed: AHashSet<PhaseId> = persisted
            .phases
            .iter()
            .filter(|old| {
                current
                    .phase(&old.id)
                    .is_some_and(|new| new.name != old.name)
            })
            .map(|old| old.id.clone())
            .collect();

        let current_ids: AHashSet<&PhaseId> = current.phases.iter().map(|p| &p.id).collect();
        let persisted_ids: AHashSet<&PhaseId> = persisted.phases.iter().map(|p| &p.id).collect();
        let student: AHashSet<&StudentFlowEdge> = current.student_flow.iter().collect();
        let student_old: AHashSet<&StudentFlowEdge> = persisted.student_flow.iter().collect();
        let data: AHashSet<&DataFlowEdge> = current.data_flow.iter().collect();
        let data_old: AHashSet<&DataFlowEdge> = persisted.data_flow.iter().collect();
        let structurally_modified =
            current_ids != persisted_ids || student != student_old || data != data_old;

        let next_token = current
            .phases
            .iter()
            .filter_map(|p| match p.id {
                PhaseId::Pending(token) => Some(token + 1),
                PhaseId::Persisted(_) => None,
            })
            .max()
            .unwrap_or(0);

        Self {
            course_id: course_id.into(),
            current,
            persisted,
            renamed,
            structurally_modified,
            next_token,
        }
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    /// The current editable snapshot.
    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.current
    }

    /// The last-known-persisted snapshot.
    pub fn persisted(&self) -> &GraphSnapshot {
        &self.persisted
    }

    /// Whether anything (structure or names) differs from the persisted state.
    pub fn is_modified(&self) -> bool {
        self.structurally_modified || !self.renamed.is_empty()
    }

    /// Adds a phase of the given type with a fresh placeholder identifier.
    ///
    /// The very first phase of a course must be of an initial-phase type, and
    /// a graph can never hold two initial phases.
    pub fn add_phase(
        &mut self,
        phase_type: &PhaseType,
        position: Position,
    ) -> Result<PhaseId, EditError> {
        match self.current.initial_phase() {
            Some(existing) if phase_type.initial_phase => {
                return Err(EditError::InitialPhaseExists {
                    attempted: phase_type.name.clone(),
                    existing: existing.name.clone(),
                });
            }
            None if !phase_type.initial_phase => {
                return Err(EditError::MissingInitialPhase {
                    type_name: phase_type.name.clone(),
                });
            }
            _ => {}
        }

        let id = PhaseId::Pending(self.next_token);
        self.next_token += 1;
        self.current.phases.push(Phase {
            id: id.clone(),
            name: phase_type.name.clone(),
            phase_type: phase_type.clone(),
            is_initial: phase_type.initial_phase,
            position,
        });
        self.structurally_modified = true;
        debug!(course = %self.course_id, phase = %id, "added phase");
        Ok(id)
    }

    /// Sets a phase's display name.
    ///
    /// Renaming flags the phase as modified separately from structural edits;
    /// a pending phase carries its latest name into the create call instead.
    pub fn rename_phase(&mut self, id: &PhaseId, name: impl Into<String>) -> Result<(), EditError> {
        let name = name.into();
        let phase = self
            .current
            .phase_mut(id)
            .ok_or_else(|| EditError::PhaseNotFound { id: id.clone() })?;
        if phase.name == name {
            return Ok(());
        }
        phase.name = name;
        if !id.is_pending() {
            self.renamed.insert(id.clone());
        }
        Ok(())
    }

    /// Removes a phase and every edge touching it. The initial phase cannot be
    /// removed, as that would leave the chain without a root.
    pub fn remove_phase(&mut self, id: &PhaseId) -> Result<(), EditError> {
        let phase = self
            .current
            .phase(id)
            .ok_or_else(|| EditError::PhaseNotFound { id: id.clone() })?;
        if phase.is_initial {
            return Err(EditError::RemoveInitialPhase {
                name: phase.name.clone(),
            });
        }
        self.current.phases.retain(|p| &p.id != id);
        self.current.remove_edges_touching(id);
        self.renamed.remove(id);
        self.structurally_modified = true;
        debug!(course = %self.course_id, phase = %id, "removed phase");
        Ok(())
    }

    /// Moves a phase on the canvas. Positions are presentation-only and do not
    /// mark the graph as modified.
    pub fn set_phase_position(&mut self, id: &PhaseId, position: Position) -> Result<(), EditError> {
        let phase = self
            .current
            .phase_mut(id)
            .ok_or_else(|| EditError::PhaseNotFound { id: id.clone() })?;
        phase.position = position;
        Ok(())
    }

    /// Adds a student-flow edge if the validator admits it.
    ///
    /// Returns whether the edge was added; a rejection is logged and leaves
    /// the graph untouched.
    pub fn connect_student_flow(&mut self, from: &PhaseId, to: &PhaseId) -> bool {
        if let Err(rejection) = validate::check_student_edge(&self.current, from, to) {
            warn!(%rejection, %from, %to, "student-flow connection rejected");
            return false;
        }
        self.current.student_flow.push(StudentFlowEdge {
            from: from.clone(),
            to: to.clone(),
        });
        self.structurally_modified = true;
        true
    }

    /// Adds a data-flow edge if the validator admits it.
    pub fn connect_data_flow(
        &mut self,
        kind: DataFlowKind,
        from: &PhaseId,
        from_connection: &str,
        to: &PhaseId,
        to_connection: &str,
    ) -> bool {
        if let Err(rejection) =
            validate::check_data_edge(&self.current, kind, from, from_connection, to, to_connection)
        {
            warn!(%rejection, %kind, %from, %to, "data-flow connection rejected");
            return false;
        }
        self.current.data_flow.push(DataFlowEdge {
            kind,
            from: from.clone(),
            from_connection: from_connection.to_string(),
            to: to.clone(),
            to_connection: to_connection.to_string(),
        });
        self.structurally_modified = true;
        true
    }

    /// Removes the student-flow edge `from -> to`. Returns whether it existed.
    pub fn disconnect_student_flow(&mut self, from: &PhaseId, to: &PhaseId) -> bool {
        let before = self.current.student_flow.len();
        self.current
            .student_flow
            .retain(|e| !(&e.from == from && &e.to == to));
        let removed = self.current.student_flow.len() != before;
        if removed {
            self.structurally_modified = true;
        }
        removed
    }

    /// Removes the data-flow edge feeding a target connection point, which is
    /// unique per namespace. Returns whether it existed.
    pub fn disconnect_data_flow(
        &mut self,
        kind: DataFlowKind,
        to: &PhaseId,
        to_connection: &str,
    ) -> bool {
        let before = self.current.data_flow.len();
        self.current
            .data_flow
            .retain(|e| !(e.kind == kind && &e.to == to && e.to_connection == to_connection));
        let removed = self.current.data_flow.len() != before;
        if removed {
            self.structurally_modified = true;
        }
        removed
    }

    /// Persisted phases missing from the current snapshot, i.e. the delete
    /// list of the next save.
    pub(crate) fn removed_phase_ids(&self) -> Vec<String> {
        self.persisted
            .phases
            .iter()
            .filter(|p| !self.current.contains(&p.id))
            .filter_map(|p| p.id.as_persisted().map(str::to_string))
            .collect()
    }

    /// Pending phases in creation order.
    pub(crate) fn pending_phases(&self) -> Vec<(LocalToken, &Phase)> {
        self.current
            .phases
            .iter()
            .filter_map(|p| match p.id {
                PhaseId::Pending(token) => Some((token, p)),
                PhaseId::Persisted(_) => None,
            })
            .sorted_by_key(|(token, _)| *token)
            .collect()
    }

    /// Renamed persisted phases with their current names, in a stable order.
    pub(crate) fn renamed_phases(&self) -> Vec<(String, String)> {
        self.renamed
            .iter()
            .filter_map(|id| {
                let phase = self.current.phase(id)?;
                Some((id.as_persisted()?.to_string(), phase.name.clone()))
            })
            .sorted()
            .collect()
    }

    /// Swaps a placeholder for the store-assigned identifier, rewriting the
    /// phase and every edge endpoint referencing it.
    pub(crate) fn resolve_placeholder(&mut self, token: LocalToken, persisted: &str) {
        let old = PhaseId::Pending(token);
        let new = PhaseId::Persisted(persisted.to_string());
        self.current.rewrite_phase_id(&old, new);
    }

    /// Records a remotely confirmed deletion so a retried save skips it.
    pub(crate) fn confirm_delete(&mut self, persisted_id: &str) {
        let id = PhaseId::Persisted(persisted_id.to_string());
        self.persisted.phases.retain(|p| p.id != id);
        self.persisted.remove_edges_touching(&id);
    }

    /// Records a remotely confirmed rename so a retried save skips it.
    pub(crate) fn confirm_rename(&mut self, persisted_id: &str) {
        let id = PhaseId::Persisted(persisted_id.to_string());
        if let Some(name) = self.current.phase(&id).map(|p| p.name.clone()) {
            if let Some(old) = self.persisted.phase_mut(&id) {
                old.name = name;
            }
        }
        self.renamed.remove(&id);
    }

    /// Promotes the current snapshot to persisted and clears all modification
    /// flags. Called after the final graph push succeeded.
    pub(crate) fn mark_saved(&mut self) {
        self.persisted = self.current.clone();
        self.renamed.clear();
        self.structurally_modified = false;
    }
}
