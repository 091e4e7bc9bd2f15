use crate::selection::AnalysisRequest;
use crate::state::{JobHandle, RunId};

/// Work the engine performs on behalf of the pure core.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Upload pending files in order and start the job. Supersedes any
    /// still-running poll loop of an earlier run.
    Submit { run_id: RunId, request: AnalysisRequest },
    /// Wait one poll interval, then issue exactly one status query.
    PollStatus {
        run_id: RunId,
        handle: JobHandle,
        iteration: u32,
    },
    /// Retrieve the terminal result payload.
    FetchResult {
        run_id: RunId,
        job_id: String,
        comparison: bool,
    },
    /// Cancel any outstanding poll sleep; no server-side call is made.
    CancelPolling,
}
