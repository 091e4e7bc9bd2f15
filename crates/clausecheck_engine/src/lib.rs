//! Clausecheck engine: backend client and effect execution.
mod client;
mod engine;
mod submit;
mod types;
mod wire;

pub use client::{
    ApiError, BackendClient, ClientSettings, JobStatusReport, ReqwestBackendClient,
    UploadedDocument,
};
pub use engine::{EngineConfig, EngineHandle};
pub use submit::run_submission;
pub use types::EngineEvent;
