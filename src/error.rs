use crate::graph::PhaseId;
use crate::save::{GraphKind, SaveReport};
use thiserror::Error;

/// Errors returned by the mutation primitives of a [`CourseGraph`](crate::graph::CourseGraph).
///
/// These cover structurally impossible edits. Edge connections that merely fail
/// validation are not errors; they are rejected as a logged no-op.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("phase '{id}' does not exist in the current graph")]
    PhaseNotFound { id: PhaseId },

    #[error("cannot add initial phase '{attempted}': '{existing}' is already the initial phase")]
    InitialPhaseExists { attempted: String, existing: String },

    #[error("the first phase of a course must be an initial phase, but '{type_name}' is not")]
    MissingInitialPhase { type_name: String },

    #[error("the initial phase '{name}' cannot be removed")]
    RemoveInitialPhase { name: String },
}

/// Errors reported by a [`PhaseStore`](crate::store::PhaseStore) implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("'{0}' was not found in the external store")]
    NotFound(String),

    #[error("the external store rejected the operation: {0}")]
    Rejected(String),

    #[error("transport failure while reaching the external store: {0}")]
    Transport(String),

    #[error("the external store returned inconsistent data: {0}")]
    Inconsistent(String),
}

/// The step at which a save sequence aborted, with the underlying store failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaveErrorKind {
    #[error("failed to delete phase '{id}': {source}")]
    DeleteFailed { id: String, source: StoreError },

    #[error("failed to create phase '{name}': {source}")]
    CreateFailed { name: String, source: StoreError },

    #[error("failed to rename phase '{id}': {source}")]
    RenameFailed { id: String, source: StoreError },

    #[error("failed to replace the {kind} graph: {source}")]
    GraphPushFailed { kind: GraphKind, source: StoreError },

    #[error("phase '{id}' still had a placeholder identifier when assembling the graph payloads")]
    UnresolvedPlaceholder { id: String },
}

/// A failed save.
///
/// The save sequence aborts on the first failing remote operation and performs
/// no compensation, so `progress` records which operations had already
/// completed. Persisting it (see [`SaveReport::to_bytes`]) makes a later retry
/// auditable.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}")]
pub struct SaveError {
    pub kind: SaveErrorKind,
    pub progress: SaveReport,
}

impl SaveError {
    pub fn new(kind: SaveErrorKind, progress: SaveReport) -> Self {
        Self { kind, progress }
    }
}
