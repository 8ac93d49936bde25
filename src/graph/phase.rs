use crate::catalog::PhaseType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-local token identifying a phase that has not been created remotely yet.
pub type LocalToken = u64;

/// Identifier of a phase.
///
/// Exactly one kind is active at any time: a phase is either persisted under a
/// store-assigned identifier or pending under a client-local token. The
/// reconciliation engine rewrites `Pending` to `Persisted` as create calls
/// succeed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseId {
    /// Opaque identifier assigned by the external store.
    Persisted(String),
    /// Placeholder for a phase awaiting remote creation.
    Pending(LocalToken),
}

impl PhaseId {
    pub fn is_pending(&self) -> bool {
        matches!(self, PhaseId::Pending(_))
    }

    /// The store-assigned identifier, if this phase has one.
    pub fn as_persisted(&self) -> Option<&str> {
        match self {
            PhaseId::Persisted(id) => Some(id),
            PhaseId::Pending(_) => None,
        }
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseId::Persisted(id) => write!(f, "{}", id),
            PhaseId::Pending(token) => write!(f, "pending-{}", token),
        }
    }
}

/// Canvas position of a phase. Presentation-only; it never affects
/// reconciliation and is not pushed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A node in the course graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub id: PhaseId,
    /// Display name, editable after creation.
    pub name: String,
    /// Catalog entry this phase was created from. Immutable post-creation.
    pub phase_type: PhaseType,
    pub is_initial: bool,
    pub position: Position,
}
