//! In-memory [`PhaseStore`] with injectable failures.
//!
//! Backs the integration tests and the CLI. Mutations are recorded in a call
//! log, and individual operations can be armed to fail after a number of
//! successful calls, which is how partial-save scenarios are exercised.

use crate::catalog::{DataFlowKind, PhaseType};
use crate::error::StoreError;
use crate::store::{DataEdgeRecord, PhaseRecord, PhaseStore, StudentFlowRecord};
use ahash::AHashMap;
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

/// A mutating store operation, used for call logging and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    CreatePhase,
    DeletePhase,
    RenamePhase,
    ReplaceStudentFlow,
    ReplacePhaseData,
    ReplaceParticipationData,
}

#[derive(Default)]
struct StoreState {
    phase_types: Vec<PhaseType>,
    /// `phase id -> (course id, record)`.
    phases: AHashMap<String, (String, PhaseRecord)>,
    student_flow: AHashMap<String, StudentFlowRecord>,
    data_flow: AHashMap<(String, DataFlowKind), Vec<DataEdgeRecord>>,
    next_id: u64,
    log: Vec<StoreOp>,
    /// `op -> remaining successful calls before one injected failure`.
    failures: AHashMap<StoreOp, usize>,
}

/// An in-memory phase store.
pub struct InMemoryPhaseStore {
    state: Mutex<StoreState>,
}

impl InMemoryPhaseStore {
    pub fn new(phase_types: Vec<PhaseType>) -> Self {
        Self {
            state: Mutex::new(StoreState {
                phase_types,
                next_id: 1,
                ..StoreState::default()
            }),
        }
    }

    /// Arms `op` to fail once with a transport error after `successes` more
    /// successful calls of that operation.
    pub fn fail_after(&self, op: StoreOp, successes: usize) {
        self.lock().failures.insert(op, successes);
    }

    /// All mutating calls received so far, in order.
    pub fn mutations(&self) -> Vec<StoreOp> {
        self.lock().log.clone()
    }

    pub fn phases(&self, course_id: &str) -> Vec<PhaseRecord> {
        let state = self.lock();
        let mut phases: Vec<PhaseRecord> = state
            .phases
            .values()
            .filter(|(course, _)| course == course_id)
            .map(|(_, record)| record.clone())
            .collect();
        phases.sort_by(|a, b| a.id.cmp(&b.id));
        phases
    }

    pub fn student_flow(&self, course_id: &str) -> StudentFlowRecord {
        self.lock()
            .student_flow
            .get(course_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn data_flow(&self, course_id: &str, kind: DataFlowKind) -> Vec<DataEdgeRecord> {
        self.lock()
            .data_flow
            .get(&(course_id.to_string(), kind))
            .cloned()
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // A poisoned lock only means a test panicked mid-call; the state is
        // still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StoreState {
    /// Failure-injection and logging gate every mutation passes through.
    fn admit(&mut self, op: StoreOp) -> Result<(), StoreError> {
        if let Some(remaining) = self.failures.get_mut(&op) {
            if *remaining == 0 {
                self.failures.remove(&op);
                return Err(StoreError::Transport(format!("injected failure for {:?}", op)));
            }
            *remaining -= 1;
        }
        self.log.push(op);
        Ok(())
    }
}

#[async_trait]
impl PhaseStore for InMemoryPhaseStore {
    async fn fetch_phase_types(&self) -> Result<Vec<PhaseType>, StoreError> {
        Ok(self.lock().phase_types.clone())
    }

    async fn fetch_phases(&self, course_id: &str) -> Result<Vec<PhaseRecord>, StoreError> {
        Ok(self.phases(course_id))
    }

    async fn fetch_student_flow(&self, course_id: &str) -> Result<StudentFlowRecord, StoreError> {
        Ok(self.student_flow(course_id))
    }

    async fn fetch_data_flow(
        &self,
        course_id: &str,
        kind: DataFlowKind,
    ) -> Result<Vec<DataEdgeRecord>, StoreError> {
        Ok(self.data_flow(course_id, kind))
    }

    async fn create_phase(
        &self,
        course_id: &str,
        name: &str,
        phase_type_id: &str,
        is_initial: bool,
    ) -> Result<String, StoreError> {
        let mut state = self.lock();
        state.admit(StoreOp::CreatePhase)?;
        if !state.phase_types.iter().any(|t| t.id == phase_type_id) {
            return Err(StoreError::Rejected(format!(
                "unknown phase type '{}'",
                phase_type_id
            )));
        }
        let id = format!("phase-{}", state.next_id);
        state.next_id += 1;
        state.phases.insert(
            id.clone(),
            (
                course_id.to_string(),
                PhaseRecord {
                    id: id.clone(),
                    name: name.to_string(),
                    phase_type_id: phase_type_id.to_string(),
                    is_initial,
                },
            ),
        );
        Ok(id)
    }

    async fn delete_phase(&self, phase_id: &str) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.admit(StoreOp::DeletePhase)?;
        let (course_id, _) = state
            .phases
            .remove(phase_id)
            .ok_or_else(|| StoreError::NotFound(phase_id.to_string()))?;
        // The backend cascades: edges referencing a deleted phase disappear.
        if let Some(flow) = state.student_flow.get_mut(&course_id) {
            flow.edges
                .retain(|e| e.from != phase_id && e.to != phase_id);
            if flow.initial_phase.as_deref() == Some(phase_id) {
                flow.initial_phase = None;
            }
        }
        for edges in state.data_flow.values_mut() {
            edges.retain(|e| e.from != phase_id && e.to != phase_id);
        }
        Ok(())
    }

    async fn rename_phase(&self, phase_id: &str, name: &str) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.admit(StoreOp::RenamePhase)?;
        let (_, record) = state
            .phases
            .get_mut(phase_id)
            .ok_or_else(|| StoreError::NotFound(phase_id.to_string()))?;
        record.name = name.to_string();
        Ok(())
    }

    async fn replace_student_flow(
        &self,
        course_id: &str,
        flow: &StudentFlowRecord,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.admit(StoreOp::ReplaceStudentFlow)?;
        state
            .student_flow
            .insert(course_id.to_string(), flow.clone());
        Ok(())
    }

    async fn replace_data_flow(
        &self,
        course_id: &str,
        kind: DataFlowKind,
        edges: &[DataEdgeRecord],
    ) -> Result<(), StoreError> {
        let op = match kind {
            DataFlowKind::PhaseData => StoreOp::ReplacePhaseData,
            DataFlowKind::ParticipationData => StoreOp::ReplaceParticipationData,
        };
        let mut state = self.lock();
        state.admit(op)?;
        state
            .data_flow
            .insert((course_id.to_string(), kind), edges.to_vec());
        Ok(())
    }
}
