use clausecheck_core::{JobHandle, JobStatus, RawAnalysisPayload, RunId};

/// Outcome of one executed effect, tagged with the run generation so the
/// pure core can drop anything from a superseded run.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Submitted {
        run_id: RunId,
        handle: JobHandle,
    },
    SubmissionFailed {
        run_id: RunId,
        message: String,
    },
    Status {
        run_id: RunId,
        status: JobStatus,
        stage_token: Option<String>,
        percent: Option<u8>,
        error_message: Option<String>,
    },
    PollFailed {
        run_id: RunId,
        message: String,
    },
    Result {
        run_id: RunId,
        payload: RawAnalysisPayload,
    },
    ResultFetchFailed {
        run_id: RunId,
        message: String,
    },
}
