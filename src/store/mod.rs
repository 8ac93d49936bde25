//! The external phase-store port.
//!
//! The network layer is not part of this crate; the save engine and hydration
//! only ever talk to the [`PhaseStore`] trait. Records mirror the wire shapes
//! of the course-configuration endpoints: plain persisted identifiers, no
//! placeholders.

use crate::catalog::{DataFlowKind, PhaseType};
use crate::error::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod memory;

pub use memory::*;

/// A persisted phase as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub id: String,
    pub name: String,
    pub phase_type_id: String,
    pub is_initial: bool,
}

/// One ordering edge of the student-flow chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentEdgeRecord {
    pub from: String,
    pub to: String,
}

/// The full student-flow chain of a course. Replaced wholesale on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentFlowRecord {
    pub initial_phase: Option<String>,
    pub edges: Vec<StudentEdgeRecord>,
}

/// One data-flow edge of a single namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataEdgeRecord {
    pub from: String,
    pub from_connection: String,
    pub to: String,
    pub to_connection: String,
}

/// Operations the external store exposes for course phase configuration.
///
/// Mutations are not transactional across calls; the save engine sequences
/// them and aborts on the first failure.
#[async_trait]
pub trait PhaseStore: Send + Sync {
    async fn fetch_phase_types(&self) -> Result<Vec<PhaseType>, StoreError>;

    async fn fetch_phases(&self, course_id: &str) -> Result<Vec<PhaseRecord>, StoreError>;

    async fn fetch_student_flow(&self, course_id: &str) -> Result<StudentFlowRecord, StoreError>;

    async fn fetch_data_flow(
        &self,
        course_id: &str,
        kind: DataFlowKind,
    ) -> Result<Vec<DataEdgeRecord>, StoreError>;

    /// Creates a phase and returns its store-assigned identifier.
    async fn create_phase(
        &self,
        course_id: &str,
        name: &str,
        phase_type_id: &str,
        is_initial: bool,
    ) -> Result<String, StoreError>;

    async fn delete_phase(&self, phase_id: &str) -> Result<(), StoreError>;

    async fn rename_phase(&self, phase_id: &str, name: &str) -> Result<(), StoreError>;

    /// Replaces the entire student-flow chain of a course.
    async fn replace_student_flow(
        &self,
        course_id: &str,
        flow: &StudentFlowRecord,
    ) -> Result<(), StoreError>;

    /// Replaces all data-flow edges of one namespace for a course.
    async fn replace_data_flow(
        &self,
        course_id: &str,
        kind: DataFlowKind,
        edges: &[DataEdgeRecord],
    ) -> Result<(), StoreError>;
}
