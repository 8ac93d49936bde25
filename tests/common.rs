//! Common test utilities for building catalogs, graphs and stores.
use phasegraph::prelude::*;

fn connection(name: &str, data_type: &str, kind: DataFlowKind) -> ConnectionPoint {
    ConnectionPoint {
        name: name.to_string(),
        data_type: data_type.to_string(),
        kind,
    }
}

/// A small phase type catalog: one initial type and two follow-up types with
/// compatible data connection points.
#[allow(dead_code)]
pub fn catalog() -> Vec<PhaseType> {
    vec![
        PhaseType {
            id: "application".to_string(),
            name: "Application".to_string(),
            initial_phase: true,
            provided_outputs: vec![
                connection("score", "score", DataFlowKind::ParticipationData),
                connection("devices", "devices", DataFlowKind::ParticipationData),
                connection("forms", "form-set", DataFlowKind::PhaseData),
            ],
            required_inputs: vec![],
        },
        PhaseType {
            id: "interview".to_string(),
            name: "Interview".to_string(),
            initial_phase: false,
            provided_outputs: vec![connection("score", "score", DataFlowKind::ParticipationData)],
            required_inputs: vec![
                connection("score", "score", DataFlowKind::ParticipationData),
                connection("devices", "devices", DataFlowKind::ParticipationData),
            ],
        },
        PhaseType {
            id: "assessment".to_string(),
            name: "Assessment".to_string(),
            initial_phase: false,
            provided_outputs: vec![],
            required_inputs: vec![
                connection("score", "score", DataFlowKind::ParticipationData),
                connection("forms", "form-set", DataFlowKind::PhaseData),
            ],
        },
    ]
}

/// Builds `Application -> Interview -> Assessment` as an unsaved graph and
/// returns it with the three placeholder identifiers.
#[allow(dead_code)]
pub fn chain_graph() -> (CourseGraph, PhaseId, PhaseId, PhaseId) {
    let types = catalog();
    let mut graph = CourseGraph::new("ios-course");
    let a = graph
        .add_phase(&types[0], Position::default())
        .expect("initial phase");
    let b = graph
        .add_phase(&types[1], Position::default())
        .expect("second phase");
    let c = graph
        .add_phase(&types[2], Position::default())
        .expect("third phase");
    assert!(graph.connect_student_flow(&a, &b));
    assert!(graph.connect_student_flow(&b, &c));
    (graph, a, b, c)
}

/// A `Phase` with a persisted identifier, for hand-built snapshots.
#[allow(dead_code)]
pub fn persisted_phase(id: &str, name: &str, phase_type: &PhaseType) -> Phase {
    Phase {
        id: PhaseId::Persisted(id.to_string()),
        name: name.to_string(),
        phase_type: phase_type.clone(),
        is_initial: phase_type.initial_phase,
        position: Position::default(),
    }
}

/// An empty store seeded with the test catalog.
#[allow(dead_code)]
pub fn empty_store() -> InMemoryPhaseStore {
    InMemoryPhaseStore::new(catalog())
}
