//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types of the crate so callers can bring
//! the whole surface in with a single `use phasegraph::prelude::*;`.

// Catalog
pub use crate::catalog::{ConnectionPoint, DataFlowKind, PhaseType};

// Graph model
pub use crate::graph::{
    CourseGraph, DataFlowEdge, GraphSnapshot, LocalToken, Phase, PhaseId, Position,
    StudentFlowEdge,
};

// Save engine
pub use crate::save::{CreateSpec, GraphKind, Reconciler, SavePlan, SaveReport};

// Store port
pub use crate::store::{
    DataEdgeRecord, InMemoryPhaseStore, PhaseRecord, PhaseStore, StoreOp, StudentEdgeRecord,
    StudentFlowRecord,
};

// Error types
pub use crate::error::{EditError, SaveError, SaveErrorKind, StoreError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
