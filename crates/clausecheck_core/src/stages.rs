/// Number of steps in the display model the backend stages collapse into.
pub const PIPELINE_STEP_COUNT: u8 = 5;

/// One entry of the stage table: a display step plus its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStep {
    pub index: u8,
    pub label: &'static str,
}

/// Maps a backend stage token to the five-step display model.
///
/// Unknown tokens return `None` on purpose: the caller keeps the last known
/// step instead of falling back to step 0, so displayed progress only ever
/// moves forward.
pub fn lookup_stage_token(token: &str) -> Option<PipelineStep> {
    let (index, label) = match token {
        "preparing" | "downloading" => (0, "Preparing documents"),
        "extracting" | "segmenting" => (1, "Extracting clauses"),
        "embedding" | "ner" | "similarity" => (2, "Semantic analysis"),
        "rules" | "nli" => (3, "Detecting contradictions"),
        "storing" => (4, "Finalizing results"),
        "completed" => (4, "Analysis complete"),
        _ => return None,
    };
    Some(PipelineStep { index, label })
}
