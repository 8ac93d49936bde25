//! The in-memory course graph: phases, the student-flow chain and data-flow
//! edges, plus the editable session model and its structural validator.

pub mod model;
pub mod phase;
pub mod snapshot;
pub mod validate;

pub use model::*;
pub use phase::*;
pub use snapshot::*;
