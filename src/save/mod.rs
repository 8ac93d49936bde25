//! Reconciliation of an edited course graph against the external store.
//!
//! A save replays the delta between the current and persisted snapshots as a
//! fixed sequence of remote operations: delete removed phases, create pending
//! ones (resolving their placeholders from the returned identifiers), rename
//! modified ones, then replace the student-flow, phase-data and
//! participation-data graphs wholesale. The sequence is not transactional on
//! the remote side; it aborts on the first failure and relies on re-running
//! the whole save to converge. Completed operations are confirmed on the model
//! as they happen, so a retry within the same session never repeats them.

use crate::catalog::DataFlowKind;
use crate::error::{SaveError, SaveErrorKind};
use crate::graph::{CourseGraph, GraphSnapshot, PhaseId};
use crate::store::{DataEdgeRecord, PhaseStore, StudentEdgeRecord, StudentFlowRecord};
use itertools::Itertools;
use tracing::{debug, info};

pub mod plan;
pub mod report;

pub use plan::*;
pub use report::*;

/// Drives the save sequence for one store.
pub struct Reconciler<'a, S: PhaseStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: PhaseStore + ?Sized> Reconciler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Converges the persisted state to the current snapshot of `graph`.
    ///
    /// A graph with no modifications saves without issuing any remote call.
    /// On success the model's persisted snapshot is promoted and all modified
    /// flags clear; on failure the model keeps the confirmations of the steps
    /// that completed, and the returned error carries them as progress.
    pub async fn save(&self, graph: &mut CourseGraph) -> Result<SaveReport, SaveError> {
        let plan = SavePlan::compute(graph);
        if plan.is_empty() {
            debug!(course = graph.course_id(), "nothing to save");
            return Ok(SaveReport::default());
        }
        let mut report = SaveReport::default();

        // 1. Delete removed phases.
        for id in &plan.deletions {
            if let Err(source) = self.store.delete_phase(id).await {
                return Err(SaveError::new(
                    SaveErrorKind::DeleteFailed {
                        id: id.clone(),
                        source,
                    },
                    report,
                ));
            }
            graph.confirm_delete(id);
            report.deleted.push(id.clone());
        }

        // 2. Create pending phases, resolving placeholders as identifiers
        //    arrive so later steps and retries see persisted identifiers.
        for spec in &plan.creations {
            match self
                .store
                .create_phase(
                    graph.course_id(),
                    &spec.name,
                    &spec.phase_type_id,
                    spec.is_initial,
                )
                .await
            {
                Ok(persisted) => {
                    graph.resolve_placeholder(spec.token, &persisted);
                    report.created.insert(spec.token, persisted);
                }
                Err(source) => {
                    return Err(SaveError::new(
                        SaveErrorKind::CreateFailed {
                            name: spec.name.clone(),
                            source,
                        },
                        report,
                    ));
                }
            }
        }

        // 3. Rename modified phases.
        for (id, name) in &plan.renames {
            if let Err(source) = self.store.rename_phase(id, name).await {
                return Err(SaveError::new(
                    SaveErrorKind::RenameFailed {
                        id: id.clone(),
                        source,
                    },
                    report,
                ));
            }
            graph.confirm_rename(id);
            report.renamed.push(id.clone());
        }

        // 4. Replace the student-flow chain.
        let flow = student_flow_record(graph.snapshot())
            .map_err(|kind| SaveError::new(kind, report.clone()))?;
        if let Err(source) = self.store.replace_student_flow(graph.course_id(), &flow).await {
            return Err(SaveError::new(
                SaveErrorKind::GraphPushFailed {
                    kind: GraphKind::StudentFlow,
                    source,
                },
                report,
            ));
        }
        report.graphs_pushed.push(GraphKind::StudentFlow);

        // 5. + 6. Replace both data-flow graphs.
        for (kind, graph_kind) in [
            (DataFlowKind::PhaseData, GraphKind::PhaseData),
            (DataFlowKind::ParticipationData, GraphKind::ParticipationData),
        ] {
            let edges = data_flow_records(graph.snapshot(), kind)
                .map_err(|e| SaveError::new(e, report.clone()))?;
            if let Err(source) = self
                .store
                .replace_data_flow(graph.course_id(), kind, &edges)
                .await
            {
                return Err(SaveError::new(
                    SaveErrorKind::GraphPushFailed {
                        kind: graph_kind,
                        source,
                    },
                    report,
                ));
            }
            report.graphs_pushed.push(graph_kind);
        }

        graph.mark_saved();
        info!(
            course = graph.course_id(),
            deleted = report.deleted.len(),
            created = report.created.len(),
            renamed = report.renamed.len(),
            "course graph saved"
        );
        Ok(report)
    }
}

fn persisted_id(id: &PhaseId) -> Result<String, SaveErrorKind> {
    id.as_persisted()
        .map(str::to_string)
        .ok_or_else(|| SaveErrorKind::UnresolvedPlaceholder { id: id.to_string() })
}

/// Assembles the chain payload: resolved initial phase plus the edge list in
/// chain order.
fn student_flow_record(snapshot: &GraphSnapshot) -> Result<StudentFlowRecord, SaveErrorKind> {
    let initial_phase = snapshot
        .initial_phase()
        .map(|p| persisted_id(&p.id))
        .transpose()?;
    let edges = snapshot
        .student_flow_in_order()
        .into_iter()
        .map(|e| {
            Ok(StudentEdgeRecord {
                from: persisted_id(&e.from)?,
                to: persisted_id(&e.to)?,
            })
        })
        .collect::<Result<Vec<_>, SaveErrorKind>>()?;
    Ok(StudentFlowRecord {
        initial_phase,
        edges,
    })
}

/// Assembles one namespace's data-edge payload in a stable order.
fn data_flow_records(
    snapshot: &GraphSnapshot,
    kind: DataFlowKind,
) -> Result<Vec<DataEdgeRecord>, SaveErrorKind> {
    snapshot
        .data_flow_of(kind)
        .map(|e| {
            Ok(DataEdgeRecord {
                from: persisted_id(&e.from)?,
                from_connection: e.from_connection.clone(),
                to: persisted_id(&e.to)?,
                to_connection: e.to_connection.clone(),
            })
        })
        .collect::<Result<Vec<_>, SaveErrorKind>>()
        .map(|edges| {
            edges
                .into_iter()
                .sorted_by(|a, b| {
                    (&a.from, &a.from_connection, &a.to)
                        .cmp(&(&b.from, &b.from_connection, &b.to))
                })
                .collect()
        })
}
