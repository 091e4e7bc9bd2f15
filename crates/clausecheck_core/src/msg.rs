use crate::result::RawAnalysisPayload;
use crate::selection::{AnalysisMode, AnalysisType, ExistingDocument, LocalFileId};
use crate::state::{JobHandle, RunId};

/// Backend job status as reported by the status poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Unknown tokens are treated as still running; the iteration cap is the
    /// backstop if the backend never reaches a known terminal value.
    pub fn from_token(token: &str) -> JobStatus {
        match token {
            "pending" => JobStatus::Pending,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Processing,
        }
    }
}

/// Answer to the "this document was already analyzed" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerunChoice {
    /// Fetch the stored result directly; no job is submitted.
    Reuse,
    /// Run the analysis again on the existing document id.
    Rerun,
    /// Close the prompt; nothing changes.
    Dismissed,
}

/// Everything that can happen to the orchestration state, from the user or
/// from the engine. Engine-originated messages carry the run generation so a
/// superseded run's late responses are dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User switched between uploading and picking existing documents.
    ModeChanged(AnalysisMode),
    /// User switched between single analysis and multi-document comparison.
    AnalysisTypeChanged(AnalysisType),
    /// User picked a local file.
    LocalFileAdded {
        name: String,
        size_bytes: u64,
        payload: Vec<u8>,
    },
    /// User removed a previously accepted local file.
    LocalFileRemoved { local_id: LocalFileId },
    /// User clicked an existing document in the picker.
    ExistingDocumentToggled { document: ExistingDocument },
    /// User hit the analyze trigger.
    StartClicked,
    /// User answered (or dismissed) the rerun prompt.
    RerunPromptAnswered(RerunChoice),
    /// Engine: uploads finished and the job-start call succeeded.
    JobSubmitted { run_id: RunId, handle: JobHandle },
    /// Engine: an upload or the job-start call failed; no job exists.
    SubmissionFailed { run_id: RunId, message: String },
    /// Engine: one status poll round-trip completed.
    StatusReceived {
        run_id: RunId,
        status: JobStatus,
        stage_token: Option<String>,
        percent: Option<u8>,
        error_message: Option<String>,
    },
    /// Engine: a status poll request failed at the transport level.
    PollFailed { run_id: RunId, message: String },
    /// Engine: the terminal result payload arrived.
    ResultReceived {
        run_id: RunId,
        payload: RawAnalysisPayload,
    },
    /// Engine: the result fetch failed.
    ResultFetchFailed { run_id: RunId, message: String },
    /// User reset the flow back to configuration.
    ResetClicked,
}
