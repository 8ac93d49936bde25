use crate::catalog::DataFlowKind;
use crate::graph::phase::{Phase, PhaseId};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// A directed edge in the student-flow chain: students complete `from` before `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentFlowEdge {
    pub from: PhaseId,
    pub to: PhaseId,
}

/// A directed edge carrying a named data connection between two phases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataFlowEdge {
    pub kind: DataFlowKind,
    pub from: PhaseId,
    pub from_connection: String,
    pub to: PhaseId,
    pub to_connection: String,
}

/// The course graph at a point in time: phases, the student-flow chain and all
/// data-flow edges of both namespaces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub phases: Vec<Phase>,
    pub student_flow: Vec<StudentFlowEdge>,
    pub data_flow: Vec<DataFlowEdge>,
}

impl GraphSnapshot {
    pub fn phase(&self, id: &PhaseId) -> Option<&Phase> {
        self.phases.iter().find(|p| &p.id == id)
    }

    pub(crate) fn phase_mut(&mut self, id: &PhaseId) -> Option<&mut Phase> {
        self.phases.iter_mut().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &PhaseId) -> bool {
        self.phase(id).is_some()
    }

    pub fn initial_phase(&self) -> Option<&Phase> {
        self.phases.iter().find(|p| p.is_initial)
    }

    pub fn outgoing_student(&self, id: &PhaseId) -> Option<&StudentFlowEdge> {
        self.student_flow.iter().find(|e| &e.from == id)
    }

    pub fn incoming_student(&self, id: &PhaseId) -> Option<&StudentFlowEdge> {
        self.student_flow.iter().find(|e| &e.to == id)
    }

    pub fn data_flow_of(&self, kind: DataFlowKind) -> impl Iterator<Item = &DataFlowEdge> {
        self.data_flow.iter().filter(move |e| e.kind == kind)
    }

    /// The edge already occupying a target connection point, if any.
    pub fn incoming_data(
        &self,
        kind: DataFlowKind,
        to: &PhaseId,
        to_connection: &str,
    ) -> Option<&DataFlowEdge> {
        self.data_flow
            .iter()
            .find(|e| e.kind == kind && &e.to == to && e.to_connection == to_connection)
    }

    /// Student-flow edges ordered by walking the chain from the initial phase.
    ///
    /// Edges not reachable from the initial phase (a graph mid-edit may hold
    /// detached chain fragments) keep their insertion order at the end.
    pub fn student_flow_in_order(&self) -> Vec<&StudentFlowEdge> {
        let mut ordered = Vec::with_capacity(self.student_flow.len());
        let mut seen: AHashSet<&StudentFlowEdge> = AHashSet::new();

        if let Some(initial) = self.initial_phase() {
            let mut cursor = &initial.id;
            while let Some(edge) = self.outgoing_student(cursor) {
                // Guard against walking a malformed, cyclic chain forever.
                if !seen.insert(edge) {
                    break;
                }
                ordered.push(edge);
                cursor = &edge.to;
            }
        }

        for edge in &self.student_flow {
            if !seen.contains(edge) {
                ordered.push(edge);
            }
        }
        ordered
    }

    /// Drops every edge that references `id`, in both edge sets.
    pub(crate) fn remove_edges_touching(&mut self, id: &PhaseId) {
        self.student_flow.retain(|e| &e.from != id && &e.to != id);
        self.data_flow.retain(|e| &e.from != id && &e.to != id);
    }

    /// Rewrites a phase identifier everywhere it occurs: the phase itself and
    /// all edge endpoints referencing it.
    pub(crate) fn rewrite_phase_id(&mut self, old: &PhaseId, new: PhaseId) {
        if let Some(phase) = self.phase_mut(old) {
            phase.id = new.clone();
        }
        for edge in &mut self.student_flow {
            if &edge.from == old {
                edge.from = new.clone();
            }
            if &edge.to == old {
                edge.to = new.clone();
            }
        }
        for edge in &mut self.data_flow {
            if &edge.from == old {
                edge.from = new.clone();
            }
            if &edge.to == old {
                edge.to = new.clone();
            }
        }
    }
}
