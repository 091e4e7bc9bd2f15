use std::fmt;
use std::time::SystemTime;

use crate::result::ResultView;
use crate::selection::{ExistingDocument, Selection, SelectionSignal};
use crate::view_model::AppViewModel;

/// Monotonic run generation. Engine messages tagged with an older value are
/// ignored, so a superseded loop can never touch the active run.
pub type RunId = u64;

/// Handle to a backend job. Single-document runs reuse the document id; only
/// comparisons get a dedicated id from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobHandle {
    SingleDocument {
        document_id: String,
        created_at: SystemTime,
    },
    Comparison {
        comparison_id: String,
        created_at: SystemTime,
    },
}

impl JobHandle {
    pub fn job_id(&self) -> &str {
        match self {
            JobHandle::SingleDocument { document_id, .. } => document_id,
            JobHandle::Comparison { comparison_id, .. } => comparison_id,
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(self, JobHandle::Comparison { .. })
    }

    pub fn created_at(&self) -> SystemTime {
        match self {
            JobHandle::SingleDocument { created_at, .. }
            | JobHandle::Comparison { created_at, .. } => *created_at,
        }
    }
}

/// Lifecycle of the active run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Succeeded,
    Failed,
    TimedOut,
}

impl RunPhase {
    /// A run is in flight; the trigger control stays disabled.
    pub fn is_active(self) -> bool {
        matches!(self, RunPhase::Submitting | RunPhase::Polling)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunPhase::Succeeded | RunPhase::Failed | RunPhase::TimedOut
        )
    }
}

/// Display progress of the active run. `percent` comes straight from the
/// backend and is independent of `step_index`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressState {
    pub step_index: u8,
    pub percent: u8,
    pub status_text: String,
    pub phase: RunPhase,
}

/// Why a run ended without a usable result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunFailure {
    /// Upload or job-start failed; no job exists, the request is kept for retry.
    Submission(String),
    /// A single poll request failed at the transport level (no retry).
    PollTransport(String),
    /// The backend reported `failed`, with its message when it sent one.
    Backend(String),
    /// The iteration cap ran out; the remote job's state is unknown.
    Timeout,
    /// The terminal result payload could not be retrieved.
    ResultFetch(String),
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunFailure::Submission(message) => write!(f, "submission failed: {message}"),
            RunFailure::PollTransport(message) => write!(f, "status poll failed: {message}"),
            RunFailure::Backend(message) => write!(f, "{message}"),
            RunFailure::Timeout => write!(
                f,
                "analysis timed out; the job may still be running on the server"
            ),
            RunFailure::ResultFetch(message) => {
                write!(f, "failed to fetch analysis results: {message}")
            }
        }
    }
}

/// Whole orchestration state: the interactive selection plus the single
/// active-run slot (progress, handle, result).
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub(crate) selection: Selection,
    pub(crate) progress: ProgressState,
    pub(crate) result: Option<ResultView>,
    pub(crate) failure: Option<RunFailure>,
    pub(crate) last_signal: Option<SelectionSignal>,
    pub(crate) rerun_prompt: Option<ExistingDocument>,
    pub(crate) run_id: RunId,
    pub(crate) active_handle: Option<JobHandle>,
    pub(crate) iterations: u32,
    pub(crate) poll_budget: u32,
    pub(crate) run_is_multi: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            selection: Selection::new(),
            progress: ProgressState::default(),
            result: None,
            failure: None,
            last_signal: None,
            rerun_prompt: None,
            run_id: 0,
            active_handle: None,
            iterations: 0,
            poll_budget: 0,
            run_is_multi: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub fn result(&self) -> Option<&ResultView> {
        self.result.as_ref()
    }

    pub fn failure(&self) -> Option<&RunFailure> {
        self.failure.as_ref()
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            mode: self.selection.mode(),
            analysis_type: self.selection.analysis_type(),
            local_file_names: self
                .selection
                .local_files()
                .iter()
                .map(|file| file.name.clone())
                .collect(),
            existing_document_names: self
                .selection
                .existing_documents()
                .iter()
                .map(|doc| doc.name.clone())
                .collect(),
            progress: self.progress.clone(),
            run_active: self.progress.phase.is_active(),
            can_start: !self.progress.phase.is_active()
                && self.rerun_prompt.is_none()
                && self.selection.count_within_bounds(),
            rerun_prompt: self.rerun_prompt.as_ref().map(|doc| doc.name.clone()),
            signal: self.last_signal.clone(),
            failure_text: self.failure.as_ref().map(|failure| failure.to_string()),
            result: self.result.clone(),
        }
    }
}
