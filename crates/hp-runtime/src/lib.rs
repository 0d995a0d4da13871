mod boundary;
mod engine;
mod locks;
mod model;
mod options;
mod query;
pub mod testing;

pub use boundary::{EvalBoundary, EvalOutcome, EvalRequest, RequestId};
pub use engine::{EngineEvent, PollState, RootCandidate, SyncEngine};
pub use model::{
    build_model, ContainerInfo, ContainerKind, ControlHandle, ControlSlot, Label, LeafEntry,
    PathModel,
};
pub use options::{SyncOptions, DEFAULT_INTERVAL_MS};
pub use query::ViewState;
