//! Small unit tests for display formats and plan computation.
mod common;
use common::*;
use phasegraph::graph::validate::Rejection;
use phasegraph::prelude::*;

#[test]
fn phase_ids_display_their_origin() {
    assert_eq!(
        PhaseId::Persisted("phase-7".to_string()).to_string(),
        "phase-7"
    );
    assert_eq!(PhaseId::Pending(3).to_string(), "pending-3");
    assert!(PhaseId::Pending(3).is_pending());
    assert_eq!(
        PhaseId::Persisted("phase-7".to_string()).as_persisted(),
        Some("phase-7")
    );
    assert_eq!(PhaseId::Pending(3).as_persisted(), None);
}

#[test]
fn data_flow_kinds_display_as_kebab_case() {
    assert_eq!(DataFlowKind::ParticipationData.to_string(), "participation-data");
    assert_eq!(DataFlowKind::PhaseData.to_string(), "phase-data");
    assert_eq!(GraphKind::StudentFlow.to_string(), "student-flow");
}

#[test]
fn rejections_read_as_sentences() {
    let rejection = Rejection::WouldCycle {
        from: PhaseId::Persisted("phase-2".to_string()),
        to: PhaseId::Persisted("phase-1".to_string()),
    };
    assert!(rejection.to_string().contains("phase-2"));
    assert!(rejection.to_string().contains("phase-1"));

    assert!(Rejection::SelfLoop.to_string().contains("itself"));
}

#[test]
fn save_errors_display_the_failing_step() {
    let err = SaveError::new(
        SaveErrorKind::CreateFailed {
            name: "Interview".to_string(),
            source: StoreError::Transport("connection reset".to_string()),
        },
        SaveReport::default(),
    );
    let text = err.to_string();
    assert!(text.contains("Interview"));
    assert!(text.contains("connection reset"));
}

#[test]
fn an_unmodified_graph_yields_an_empty_plan() {
    let types = catalog();
    let snapshot = GraphSnapshot {
        phases: vec![persisted_phase("phase-1", "Application", &types[0])],
        student_flow: vec![],
        data_flow: vec![],
    };
    let graph = CourseGraph::from_snapshots("course", snapshot.clone(), snapshot);

    let plan = SavePlan::compute(&graph);
    assert!(plan.is_empty());
    assert!(!plan.push_graphs);
}

#[test]
fn snapshots_round_trip_through_json() {
    let (graph, _, _, _) = chain_graph();
    let json = serde_json::to_string(graph.snapshot()).expect("serialize");
    let restored: GraphSnapshot = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(&restored, graph.snapshot());
}
