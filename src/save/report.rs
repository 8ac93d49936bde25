use crate::graph::LocalToken;
use ahash::AHashMap;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three per-course graphs replaced wholesale during a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphKind {
    StudentFlow,
    PhaseData,
    ParticipationData,
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphKind::StudentFlow => write!(f, "student-flow"),
            GraphKind::PhaseData => write!(f, "phase-data"),
            GraphKind::ParticipationData => write!(f, "participation-data"),
        }
    }
}

/// Record of the remote operations a save run completed.
///
/// Doubles as a resume token: because it carries the placeholder resolutions,
/// a report persisted after a partial failure proves which phases already
/// exist remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveReport {
    /// Persisted identifiers of deleted phases.
    pub deleted: Vec<String>,
    /// Placeholder token -> store-assigned identifier.
    pub created: AHashMap<LocalToken, String>,
    /// Persisted identifiers of renamed phases.
    pub renamed: Vec<String>,
    /// Graph replacements that completed, in push order.
    pub graphs_pushed: Vec<GraphKind>,
}

impl SaveReport {
    /// Whether the save performed any remote operation at all.
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty()
            && self.created.is_empty()
            && self.renamed.is_empty()
            && self.graphs_pushed.is_empty()
    }

    /// Serializes the report to the bincode format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::error::EncodeError> {
        encode_to_vec(self, standard())
    }

    /// Deserializes a report from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::error::DecodeError> {
        decode_from_slice(bytes, standard()).map(|(report, _)| report)
    }
}
