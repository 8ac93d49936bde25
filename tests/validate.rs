//! Tests for the structural validator.
mod common;
use common::*;
use phasegraph::graph::validate::{
    can_add_data_edge, can_add_student_edge, check_data_edge, check_snapshot, check_student_edge,
    Rejection,
};
use phasegraph::prelude::*;

#[test]
fn closing_the_chain_into_a_cycle_is_rejected() {
    let (mut graph, a, _, c) = chain_graph();
    let edges_before = graph.snapshot().student_flow.clone();

    assert!(!graph.connect_student_flow(&c, &a));

    assert_eq!(graph.snapshot().student_flow, edges_before);
    assert_eq!(
        check_student_edge(graph.snapshot(), &c, &a),
        Err(Rejection::WouldCycle {
            from: c.clone(),
            to: a.clone()
        })
    );
}

#[test]
fn self_loops_are_rejected_before_the_cycle_search() {
    let (graph, a, _, _) = chain_graph();
    assert_eq!(
        check_student_edge(graph.snapshot(), &a, &a),
        Err(Rejection::SelfLoop)
    );
}

#[test]
fn a_phase_keeps_at_most_one_outgoing_and_incoming_chain_edge() {
    let types = catalog();
    let mut graph = CourseGraph::new("course");
    let a = graph.add_phase(&types[0], Position::default()).expect("a");
    let b = graph.add_phase(&types[1], Position::default()).expect("b");
    let c = graph.add_phase(&types[2], Position::default()).expect("c");
    assert!(graph.connect_student_flow(&a, &b));

    // `a` already points at `b`.
    assert_eq!(
        check_student_edge(graph.snapshot(), &a, &c),
        Err(Rejection::OutgoingOccupied(a.clone()))
    );
    // `b` is already pointed at.
    assert_eq!(
        check_student_edge(graph.snapshot(), &c, &b),
        Err(Rejection::IncomingOccupied(b.clone()))
    );
    assert!(can_add_student_edge(graph.snapshot(), &b, &c));
}

#[test]
fn unknown_phases_are_rejected() {
    let (graph, a, _, _) = chain_graph();
    let ghost = PhaseId::Persisted("ghost".to_string());
    assert_eq!(
        check_student_edge(graph.snapshot(), &a, &ghost),
        Err(Rejection::UnknownPhase(ghost.clone()))
    );
    assert_eq!(
        check_student_edge(graph.snapshot(), &ghost, &a),
        Err(Rejection::UnknownPhase(ghost))
    );
}

#[test]
fn data_edges_accept_compatible_downstream_connections() {
    let (graph, a, b, c) = chain_graph();
    assert!(can_add_data_edge(
        graph.snapshot(),
        DataFlowKind::ParticipationData,
        &a,
        "score",
        &b,
        "score"
    ));
    // Data may also skip phases, as long as it flows forward.
    assert!(can_add_data_edge(
        graph.snapshot(),
        DataFlowKind::ParticipationData,
        &a,
        "score",
        &c,
        "score"
    ));
    assert!(can_add_data_edge(
        graph.snapshot(),
        DataFlowKind::PhaseData,
        &a,
        "forms",
        &c,
        "forms"
    ));
}

#[test]
fn a_target_connection_accepts_at_most_one_incoming_edge() {
    let (mut graph, a, b, c) = chain_graph();
    assert!(graph.connect_data_flow(
        DataFlowKind::ParticipationData,
        &a,
        "score",
        &c,
        "score"
    ));

    // The interview also provides a score, but the slot is taken.
    assert_eq!(
        check_data_edge(
            graph.snapshot(),
            DataFlowKind::ParticipationData,
            &b,
            "score",
            &c,
            "score"
        ),
        Err(Rejection::ConnectionOccupied {
            to: c.clone(),
            connection: "score".to_string()
        })
    );
}

#[test]
fn data_edges_must_name_existing_connection_points() {
    let (graph, a, b, _) = chain_graph();
    assert!(matches!(
        check_data_edge(
            graph.snapshot(),
            DataFlowKind::ParticipationData,
            &a,
            "transcript",
            &b,
            "score"
        ),
        Err(Rejection::UnknownOutput { .. })
    ));
    assert!(matches!(
        check_data_edge(
            graph.snapshot(),
            DataFlowKind::ParticipationData,
            &a,
            "score",
            &b,
            "transcript"
        ),
        Err(Rejection::UnknownInput { .. })
    ));
    // Namespaces are separate: the forms output only exists at phase level.
    assert!(matches!(
        check_data_edge(
            graph.snapshot(),
            DataFlowKind::ParticipationData,
            &a,
            "forms",
            &b,
            "score"
        ),
        Err(Rejection::UnknownOutput { .. })
    ));
}

#[test]
fn data_edges_require_matching_semantic_types() {
    let (graph, a, b, _) = chain_graph();
    assert_eq!(
        check_data_edge(
            graph.snapshot(),
            DataFlowKind::ParticipationData,
            &a,
            "devices",
            &b,
            "score"
        ),
        Err(Rejection::TypeMismatch {
            output: "devices".to_string(),
            input: "score".to_string()
        })
    );
}

#[test]
fn data_may_not_flow_against_the_chain() {
    let (graph, a, b, _) = chain_graph();
    assert_eq!(
        check_data_edge(
            graph.snapshot(),
            DataFlowKind::ParticipationData,
            &b,
            "score",
            &a,
            "score"
        ),
        Err(Rejection::UnknownInput {
            phase: a.clone(),
            kind: DataFlowKind::ParticipationData,
            connection: "score".to_string()
        })
    );

    // With compatible connection points but no chain between them, the
    // forward-only rule is what rejects the edge.
    let types = catalog();
    let mut detached = CourseGraph::new("course");
    let first = detached
        .add_phase(&types[0], Position::default())
        .expect("initial");
    let second = detached
        .add_phase(&types[1], Position::default())
        .expect("interview");
    assert_eq!(
        check_data_edge(
            detached.snapshot(),
            DataFlowKind::ParticipationData,
            &first,
            "score",
            &second,
            "score"
        ),
        Err(Rejection::NotDownstream {
            from: first,
            to: second
        })
    );
}

#[test]
fn whole_snapshots_are_checked_after_hydration() {
    let (graph, _, _, _) = chain_graph();
    assert!(check_snapshot(graph.snapshot()).is_ok());

    let types = catalog();
    let mut two_initials = GraphSnapshot::default();
    two_initials
        .phases
        .push(persisted_phase("phase-1", "Application", &types[0]));
    two_initials
        .phases
        .push(persisted_phase("phase-2", "Application Copy", &types[0]));
    assert!(matches!(
        check_snapshot(&two_initials),
        Err(Rejection::MultipleInitialPhases { .. })
    ));

    let mut no_initial = GraphSnapshot::default();
    no_initial
        .phases
        .push(persisted_phase("phase-1", "Interview", &types[1]));
    assert_eq!(check_snapshot(&no_initial), Err(Rejection::NoInitialPhase));

    // A cyclic chain smuggled in by a broken export.
    let mut cyclic = GraphSnapshot {
        phases: vec![
            persisted_phase("phase-1", "Application", &types[0]),
            persisted_phase("phase-2", "Interview", &types[1]),
        ],
        student_flow: vec![
            StudentFlowEdge {
                from: PhaseId::Persisted("phase-1".to_string()),
                to: PhaseId::Persisted("phase-2".to_string()),
            },
            StudentFlowEdge {
                from: PhaseId::Persisted("phase-2".to_string()),
                to: PhaseId::Persisted("phase-1".to_string()),
            },
        ],
        data_flow: vec![],
    };
    assert!(matches!(
        check_snapshot(&cyclic),
        Err(Rejection::IncomingOccupied(_)) | Err(Rejection::WouldCycle { .. })
    ));
    cyclic.student_flow.pop();
    assert!(check_snapshot(&cyclic).is_ok());
}
