use crate::result::ResultView;
use crate::selection::{AnalysisMode, AnalysisType, SelectionSignal};
use crate::state::ProgressState;

/// Snapshot of everything a frontend needs to render the flow.
#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel {
    pub mode: AnalysisMode,
    pub analysis_type: AnalysisType,
    pub local_file_names: Vec<String>,
    pub existing_document_names: Vec<String>,
    pub progress: ProgressState,
    /// A run is in flight; selection edits still apply to the next run.
    pub run_active: bool,
    /// Whether the analyze trigger is enabled.
    pub can_start: bool,
    /// Name of the document the rerun prompt is about, when open.
    pub rerun_prompt: Option<String>,
    pub signal: Option<SelectionSignal>,
    pub failure_text: Option<String>,
    pub result: Option<ResultView>,
}
