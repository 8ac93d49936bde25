//! The read-only phase type catalog supplied by the external store.
//!
//! Phase types describe what kinds of phases a course may contain (application,
//! interview, ...), whether they may sit at the head of the student-flow chain,
//! and which named data connection points they provide and require. The model
//! never mutates catalog entries; they are used for validation and display.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace of a data-flow edge and its connection points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFlowKind {
    /// Data attached to a single participation, following the participant.
    ParticipationData,
    /// Data attached to the phase itself, shared by all participants.
    PhaseData,
}

impl fmt::Display for DataFlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataFlowKind::ParticipationData => write!(f, "participation-data"),
            DataFlowKind::PhaseData => write!(f, "phase-data"),
        }
    }
}

/// A named input or output a phase type exposes for data-flow connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPoint {
    pub name: String,
    /// Semantic type of the transferred object, e.g. "score" or "devices".
    pub data_type: String,
    pub kind: DataFlowKind,
}

/// A catalog entry describing one kind of phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseType {
    pub id: String,
    pub name: String,
    /// Whether phases of this type may start the student-flow chain.
    pub initial_phase: bool,
    pub provided_outputs: Vec<ConnectionPoint>,
    pub required_inputs: Vec<ConnectionPoint>,
}

impl PhaseType {
    /// Looks up a provided output by namespace and name.
    pub fn provided_output(&self, kind: DataFlowKind, name: &str) -> Option<&ConnectionPoint> {
        self.provided_outputs
            .iter()
            .find(|c| c.kind == kind && c.name == name)
    }

    /// Looks up a required input by namespace and name.
    pub fn required_input(&self, kind: DataFlowKind, name: &str) -> Option<&ConnectionPoint> {
        self.required_inputs
            .iter()
            .find(|c| c.kind == kind && c.name == name)
    }
}
