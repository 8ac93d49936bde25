//! Pure structural validation of proposed edges and whole snapshots.
//!
//! Validation gates every connect operation on the model. A failed check is a
//! rejection, not an error: the model logs it and leaves the graph unchanged.

use crate::catalog::DataFlowKind;
use crate::graph::phase::PhaseId;
use crate::graph::snapshot::GraphSnapshot;
use ahash::AHashSet;
use thiserror::Error;

/// Why a proposed edge (or a hydrated snapshot) failed validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("a phase cannot be connected to itself")]
    SelfLoop,

    #[error("phase '{0}' does not exist in the graph")]
    UnknownPhase(PhaseId),

    #[error("phase '{0}' already has an outgoing student-flow edge")]
    OutgoingOccupied(PhaseId),

    #[error("phase '{0}' already has an incoming student-flow edge")]
    IncomingOccupied(PhaseId),

    #[error("connecting '{from}' to '{to}' would close a cycle in the student-flow chain")]
    WouldCycle { from: PhaseId, to: PhaseId },

    #[error("connection point '{connection}' on phase '{to}' already has an incoming data edge")]
    ConnectionOccupied { to: PhaseId, connection: String },

    #[error("phase '{phase}' provides no {kind} output named '{connection}'")]
    UnknownOutput {
        phase: PhaseId,
        kind: DataFlowKind,
        connection: String,
    },

    #[error("phase '{phase}' requires no {kind} input named '{connection}'")]
    UnknownInput {
        phase: PhaseId,
        kind: DataFlowKind,
        connection: String,
    },

    #[error("output type '{output}' does not match input type '{input}'")]
    TypeMismatch { output: String, input: String },

    #[error("data may only flow forward: '{to}' is not downstream of '{from}' in the student-flow chain")]
    NotDownstream { from: PhaseId, to: PhaseId },

    #[error("a non-empty graph must have exactly one initial phase")]
    NoInitialPhase,

    #[error("phases '{first}' and '{second}' are both flagged as the initial phase")]
    MultipleInitialPhases { first: PhaseId, second: PhaseId },
}

/// Checks whether a student-flow edge `from -> to` may be added.
pub fn check_student_edge(
    snapshot: &GraphSnapshot,
    from: &PhaseId,
    to: &PhaseId,
) -> Result<(), Rejection> {
    if from == to {
        return Err(Rejection::SelfLoop);
    }
    if !snapshot.contains(from) {
        return Err(Rejection::UnknownPhase(from.clone()));
    }
    if !snapshot.contains(to) {
        return Err(Rejection::UnknownPhase(to.clone()));
    }
    if snapshot.outgoing_student(from).is_some() {
        return Err(Rejection::OutgoingOccupied(from.clone()));
    }
    if snapshot.incoming_student(to).is_some() {
        return Err(Rejection::IncomingOccupied(to.clone()));
    }
    if reaches(snapshot, to, from) {
        return Err(Rejection::WouldCycle {
            from: from.clone(),
            to: to.clone(),
        });
    }
    Ok(())
}

/// Convenience predicate form of [`check_student_edge`].
pub fn can_add_student_edge(snapshot: &GraphSnapshot, from: &PhaseId, to: &PhaseId) -> bool {
    check_student_edge(snapshot, from, to).is_ok()
}

/// Checks whether a data-flow edge may be added.
///
/// Besides fan-in and catalog checks, the target must be strictly downstream
/// of the source in student-flow order: a phase can only consume data from
/// phases its participants have already passed through.
pub fn check_data_edge(
    snapshot: &GraphSnapshot,
    kind: DataFlowKind,
    from: &PhaseId,
    from_connection: &str,
    to: &PhaseId,
    to_connection: &str,
) -> Result<(), Rejection> {
    check_data_edge_shape(snapshot, kind, from, from_connection, to, to_connection)?;
    if snapshot.incoming_data(kind, to, to_connection).is_some() {
        return Err(Rejection::ConnectionOccupied {
            to: to.clone(),
            connection: to_connection.to_string(),
        });
    }
    Ok(())
}

/// Everything [`check_data_edge`] verifies except fan-in, which whole-snapshot
/// validation tracks separately.
fn check_data_edge_shape(
    snapshot: &GraphSnapshot,
    kind: DataFlowKind,
    from: &PhaseId,
    from_connection: &str,
    to: &PhaseId,
    to_connection: &str,
) -> Result<(), Rejection> {
    if from == to {
        return Err(Rejection::SelfLoop);
    }
    let from_phase = snapshot
        .phase(from)
        .ok_or_else(|| Rejection::UnknownPhase(from.clone()))?;
    let to_phase = snapshot
        .phase(to)
        .ok_or_else(|| Rejection::UnknownPhase(to.clone()))?;

    let output = from_phase
        .phase_type
        .provided_output(kind, from_connection)
        .ok_or_else(|| Rejection::UnknownOutput {
            phase: from.clone(),
            kind,
            connection: from_connection.to_string(),
        })?;
    let input = to_phase
        .phase_type
        .required_input(kind, to_connection)
        .ok_or_else(|| Rejection::UnknownInput {
            phase: to.clone(),
            kind,
            connection: to_connection.to_string(),
        })?;
    if output.data_type != input.data_type {
        return Err(Rejection::TypeMismatch {
            output: output.data_type.clone(),
            input: input.data_type.clone(),
        });
    }

    if !reaches(snapshot, from, to) {
        return Err(Rejection::NotDownstream {
            from: from.clone(),
            to: to.clone(),
        });
    }
    Ok(())
}

/// Convenience predicate form of [`check_data_edge`].
pub fn can_add_data_edge(
    snapshot: &GraphSnapshot,
    kind: DataFlowKind,
    from: &PhaseId,
    from_connection: &str,
    to: &PhaseId,
    to_connection: &str,
) -> bool {
    check_data_edge(snapshot, kind, from, from_connection, to, to_connection).is_ok()
}

/// Validates a whole snapshot, e.g. after hydrating it from the store.
pub fn check_snapshot(snapshot: &GraphSnapshot) -> Result<(), Rejection> {
    let mut initial = None;
    for phase in &snapshot.phases {
        if phase.is_initial {
            if let Some(first) = initial.replace(&phase.id) {
                return Err(Rejection::MultipleInitialPhases {
                    first: first.clone(),
                    second: phase.id.clone(),
                });
            }
        }
    }
    if initial.is_none() && !snapshot.phases.is_empty() {
        return Err(Rejection::NoInitialPhase);
    }

    let mut outgoing: AHashSet<&PhaseId> = AHashSet::new();
    let mut incoming: AHashSet<&PhaseId> = AHashSet::new();
    for edge in &snapshot.student_flow {
        if edge.from == edge.to {
            return Err(Rejection::SelfLoop);
        }
        for id in [&edge.from, &edge.to] {
            if !snapshot.contains(id) {
                return Err(Rejection::UnknownPhase((*id).clone()));
            }
        }
        if !outgoing.insert(&edge.from) {
            return Err(Rejection::OutgoingOccupied(edge.from.clone()));
        }
        if !incoming.insert(&edge.to) {
            return Err(Rejection::IncomingOccupied(edge.to.clone()));
        }
    }
    for edge in &snapshot.student_flow {
        // An edge whose target reaches back to its source closes a cycle.
        if reaches(snapshot, &edge.to, &edge.from) {
            return Err(Rejection::WouldCycle {
                from: edge.from.clone(),
                to: edge.to.clone(),
            });
        }
    }

    let mut occupied: AHashSet<(DataFlowKind, &PhaseId, &str)> = AHashSet::new();
    for edge in &snapshot.data_flow {
        if !occupied.insert((edge.kind, &edge.to, edge.to_connection.as_str())) {
            return Err(Rejection::ConnectionOccupied {
                to: edge.to.clone(),
                connection: edge.to_connection.clone(),
            });
        }
        check_data_edge_shape(
            snapshot,
            edge.kind,
            &edge.from,
            &edge.from_connection,
            &edge.to,
            &edge.to_connection,
        )?;
    }
    Ok(())
}

/// Depth-first reachability along outgoing student-flow edges.
///
/// The chain is a simple path when well-formed, so this degenerates to a walk;
/// the visited set keeps the search finite on already-malformed input.
fn reaches(snapshot: &GraphSnapshot, start: &PhaseId, needle: &PhaseId) -> bool {
    let mut visited: AHashSet<&PhaseId> = AHashSet::new();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        if let Some(edge) = snapshot.outgoing_student(id) {
            if &edge.to == needle {
                return true;
            }
            stack.push(&edge.to);
        }
    }
    false
}
