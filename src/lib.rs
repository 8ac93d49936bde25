//! # Phasegraph - Course Phase Graph Model and Save Engine
//!
//! **Phasegraph** models a university course as a directed graph of phases:
//! a single student-flow chain describing the order participants progress
//! through (application, interview, ...), plus data-flow edges carrying named
//! data connections between phases in two namespaces (participation-level and
//! phase-level). It is the headless core behind a visual course configurator:
//! the UI owns rendering and drag positions, this crate owns the graph's
//! structure and its persistence protocol.
//!
//! ## Core Workflow
//!
//! 1.  **Hydrate**: load the authoritative state of a course through the
//!     [`PhaseStore`](store::PhaseStore) trait into a
//!     [`CourseGraph`](graph::CourseGraph) session, or start from an empty one.
//! 2.  **Edit**: mutate the graph through its primitives. New phases receive
//!     placeholder identifiers; every connect operation is gated by the
//!     structural validator (no cycles, single chain, fan-in one data edges,
//!     forward-only data flow) and rejected edits are logged no-ops.
//! 3.  **Save**: hand the session to a [`Reconciler`](save::Reconciler). It
//!     diffs the edited snapshot against the persisted one and replays the
//!     delta as an ordered sequence of store calls, resolving placeholders to
//!     store-assigned identifiers as create responses arrive.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use phasegraph::prelude::*;
//!
//! # async fn run(catalog: Vec<PhaseType>) -> Result<()> {
//! let store = InMemoryPhaseStore::new(catalog.clone());
//!
//! let mut graph = CourseGraph::new("ios-course");
//! let application = graph.add_phase(&catalog[0], Position::default())?;
//! let interview = graph.add_phase(&catalog[1], Position::default())?;
//!
//! // Connections go through the validator; a rejected edge is a no-op.
//! graph.connect_student_flow(&application, &interview);
//! graph.connect_data_flow(
//!     DataFlowKind::ParticipationData,
//!     &application,
//!     "score",
//!     &interview,
//!     "score",
//! );
//!
//! // Replay the edits against the store; placeholders resolve along the way.
//! let report = Reconciler::new(&store).save(&mut graph).await?;
//! println!("created {} phases", report.created.len());
//!
//! // A second save with no intervening edits issues no remote calls.
//! assert!(Reconciler::new(&store).save(&mut graph).await?.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod save;
pub mod store;
