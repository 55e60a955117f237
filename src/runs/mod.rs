pub mod controller;
pub mod registry;
pub mod store;

pub use controller::RunController;
pub use registry::{RunGuard, RunRegistry};
pub use store::{
    AnalysisRun, BriefStore, FinalizedRun, InMemoryStore, ResultStore, RunSnapshot, RunStatus,
    RunStatusUpdate,
};
