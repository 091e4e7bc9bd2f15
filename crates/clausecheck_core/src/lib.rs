//! Clausecheck core: pure state machine for the analysis-orchestration flow.
//!
//! No IO lives here. `update` applies a message to the state and returns the
//! effects the engine should execute; everything is deterministic and
//! directly testable.
mod effect;
mod msg;
mod result;
mod selection;
mod stages;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::{JobStatus, Msg, RerunChoice};
pub use result::{
    ContradictionRecord, RawAnalysisPayload, RawClause, RawContradiction, RawDocumentInfo,
    ResultView, Severity,
};
pub use selection::{
    AnalysisMode, AnalysisRequest, AnalysisType, DocumentRef, DocumentStatus, ExistingDocument,
    LocalFile, LocalFileId, Selection, SelectionSignal, ALLOWED_EXTENSIONS, MAX_FILE_SIZE_BYTES,
};
pub use stages::{lookup_stage_token, PipelineStep, PIPELINE_STEP_COUNT};
pub use state::{AppState, JobHandle, ProgressState, RunFailure, RunId, RunPhase};
pub use update::update;
pub use view_model::AppViewModel;
