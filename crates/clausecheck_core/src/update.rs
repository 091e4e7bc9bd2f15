use crate::result::ResultView;
use crate::selection::{AnalysisMode, AnalysisRequest, AnalysisType, ExistingDocument};
use crate::stages::lookup_stage_token;
use crate::state::{AppState, ProgressState, RunFailure, RunPhase};
use crate::{DocumentStatus, Effect, JobStatus, Msg, RerunChoice};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ModeChanged(mode) => {
            // Mode switches never migrate entries between the two lists.
            state.selection.set_mode(mode);
            state.last_signal = None;
            Vec::new()
        }
        Msg::AnalysisTypeChanged(analysis_type) => {
            state.selection.set_analysis_type(analysis_type);
            state.last_signal = None;
            Vec::new()
        }
        Msg::LocalFileAdded {
            name,
            size_bytes,
            payload,
        } => {
            state.last_signal = state
                .selection
                .add_local_file(name, size_bytes, payload)
                .err();
            Vec::new()
        }
        Msg::LocalFileRemoved { local_id } => {
            state.selection.remove_local_file(local_id);
            Vec::new()
        }
        Msg::ExistingDocumentToggled { document } => {
            state.last_signal = state.selection.toggle_existing(document).err();
            Vec::new()
        }
        Msg::StartClicked => start_clicked(&mut state),
        Msg::RerunPromptAnswered(choice) => rerun_answered(&mut state, choice),
        Msg::JobSubmitted { run_id, handle } => {
            if run_id != state.run_id || state.progress.phase != RunPhase::Submitting {
                return (state, Vec::new());
            }
            state.active_handle = Some(handle.clone());
            state.progress.phase = RunPhase::Polling;
            state.progress.status_text = "Waiting for analysis to start".to_string();
            vec![Effect::PollStatus {
                run_id,
                handle,
                iteration: 1,
            }]
        }
        Msg::SubmissionFailed { run_id, message } => {
            if run_id != state.run_id {
                return (state, Vec::new());
            }
            fail_run(&mut state, RunPhase::Failed, RunFailure::Submission(message));
            Vec::new()
        }
        Msg::StatusReceived {
            run_id,
            status,
            stage_token,
            percent,
            error_message,
        } => {
            if run_id != state.run_id || state.progress.phase != RunPhase::Polling {
                return (state, Vec::new());
            }
            status_received(&mut state, status, stage_token, percent, error_message)
        }
        Msg::PollFailed { run_id, message } => {
            if run_id != state.run_id || state.progress.phase != RunPhase::Polling {
                return (state, Vec::new());
            }
            fail_run(
                &mut state,
                RunPhase::Failed,
                RunFailure::PollTransport(message),
            );
            Vec::new()
        }
        Msg::ResultReceived { run_id, payload } => {
            if run_id != state.run_id {
                return (state, Vec::new());
            }
            state.progress.phase = RunPhase::Succeeded;
            state.result = Some(ResultView::from_payload(
                &payload,
                state.run_is_multi,
                state.iterations,
            ));
            state.active_handle = None;
            Vec::new()
        }
        Msg::ResultFetchFailed { run_id, message } => {
            if run_id != state.run_id {
                return (state, Vec::new());
            }
            fail_run(
                &mut state,
                RunPhase::Failed,
                RunFailure::ResultFetch(message),
            );
            Vec::new()
        }
        Msg::ResetClicked => {
            state.selection.clear();
            state.progress = ProgressState::default();
            state.result = None;
            state.failure = None;
            state.last_signal = None;
            state.rerun_prompt = None;
            state.active_handle = None;
            state.iterations = 0;
            // Bump the generation so any in-flight response is dropped.
            state.run_id += 1;
            vec![Effect::CancelPolling]
        }
    };

    (state, effects)
}

fn start_clicked(state: &mut AppState) -> Vec<Effect> {
    if state.progress.phase.is_active() {
        return Vec::new();
    }
    let request = match state.selection.build_request() {
        Ok(request) => request,
        Err(signal) => {
            state.last_signal = Some(signal);
            return Vec::new();
        }
    };

    if let Some(document) = completed_single_existing(state, &request) {
        state.rerun_prompt = Some(document);
        return Vec::new();
    }
    begin_run(state, request)
}

/// The rerun prompt only applies to a single-document run over an existing
/// document whose last known status is completed.
fn completed_single_existing(
    state: &AppState,
    request: &AnalysisRequest,
) -> Option<ExistingDocument> {
    if request.analysis_type != AnalysisType::Single
        || request.mode != AnalysisMode::SelectExisting
    {
        return None;
    }
    state
        .selection
        .existing_documents()
        .first()
        .filter(|doc| doc.last_status == DocumentStatus::Completed)
        .cloned()
}

fn rerun_answered(state: &mut AppState, choice: RerunChoice) -> Vec<Effect> {
    let Some(document) = state.rerun_prompt.take() else {
        return Vec::new();
    };
    match choice {
        RerunChoice::Dismissed => Vec::new(),
        RerunChoice::Rerun => match state.selection.build_request() {
            Ok(request) => begin_run(state, request),
            Err(signal) => {
                state.last_signal = Some(signal);
                Vec::new()
            }
        },
        RerunChoice::Reuse => {
            reset_run_slot(state, AnalysisType::Single);
            state.progress = ProgressState {
                step_index: 0,
                percent: 0,
                status_text: "Loading previous results".to_string(),
                phase: RunPhase::Submitting,
            };
            vec![Effect::FetchResult {
                run_id: state.run_id,
                job_id: document.id,
                comparison: false,
            }]
        }
    }
}

fn begin_run(state: &mut AppState, request: AnalysisRequest) -> Vec<Effect> {
    reset_run_slot(state, request.analysis_type);
    state.progress = ProgressState {
        step_index: 0,
        percent: 0,
        status_text: "Submitting documents".to_string(),
        phase: RunPhase::Submitting,
    };
    vec![Effect::Submit {
        run_id: state.run_id,
        request,
    }]
}

fn reset_run_slot(state: &mut AppState, analysis_type: AnalysisType) {
    state.run_id += 1;
    state.iterations = 0;
    state.poll_budget = analysis_type.poll_budget();
    state.run_is_multi = analysis_type == AnalysisType::Multi;
    state.active_handle = None;
    state.result = None;
    state.failure = None;
    state.last_signal = None;
    state.rerun_prompt = None;
}

fn status_received(
    state: &mut AppState,
    status: JobStatus,
    stage_token: Option<String>,
    percent: Option<u8>,
    error_message: Option<String>,
) -> Vec<Effect> {
    state.iterations += 1;

    // Unknown or missing tokens keep the last known step; displayed progress
    // never falls back to step 0 mid-run.
    if let Some(step) = stage_token.as_deref().and_then(lookup_stage_token) {
        state.progress.step_index = step.index;
        state.progress.status_text = step.label.to_string();
    }
    state.progress.percent = percent.unwrap_or(0);

    match status {
        JobStatus::Completed => {
            state.progress.phase = RunPhase::Succeeded;
            let Some(handle) = state.active_handle.take() else {
                return Vec::new();
            };
            vec![Effect::FetchResult {
                run_id: state.run_id,
                job_id: handle.job_id().to_string(),
                comparison: handle.is_comparison(),
            }]
        }
        JobStatus::Failed => {
            let message =
                error_message.unwrap_or_else(|| "Analysis failed on the server".to_string());
            fail_run(state, RunPhase::Failed, RunFailure::Backend(message));
            Vec::new()
        }
        JobStatus::Pending | JobStatus::Processing => {
            if state.iterations >= state.poll_budget {
                fail_run(state, RunPhase::TimedOut, RunFailure::Timeout);
                return Vec::new();
            }
            let Some(handle) = state.active_handle.clone() else {
                return Vec::new();
            };
            vec![Effect::PollStatus {
                run_id: state.run_id,
                handle,
                iteration: state.iterations + 1,
            }]
        }
    }
}

fn fail_run(state: &mut AppState, phase: RunPhase, failure: RunFailure) {
    state.progress.phase = phase;
    state.failure = Some(failure);
    state.result = Some(ResultView::empty(state.run_is_multi, state.iterations));
    state.active_handle = None;
}
