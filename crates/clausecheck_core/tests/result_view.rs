use std::collections::HashMap;
use std::sync::Once;
use std::time::SystemTime;

use clausecheck_core::{
    update, AppState, JobHandle, JobStatus, Msg, RawAnalysisPayload, RawClause, RawContradiction,
    RawDocumentInfo, ResultView, RunPhase, Severity,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(client_logging::initialize_for_tests);
}

fn contradiction(confidence: f64) -> RawContradiction {
    RawContradiction {
        kind: Some("numeric".to_string()),
        confidence: Some(confidence),
        description: Some("amounts disagree".to_string()),
        ..RawContradiction::default()
    }
}

fn payload_with(groups: Vec<(&str, Vec<RawContradiction>)>) -> RawAnalysisPayload {
    let mut by_severity = HashMap::new();
    let mut total = 0;
    for (severity, records) in groups {
        total += records.len() as u32;
        by_severity.insert(severity.to_string(), records);
    }
    RawAnalysisPayload {
        contradictions_by_severity: by_severity,
        total_contradictions: total,
        total_clauses: 42,
        ..RawAnalysisPayload::default()
    }
}

#[test]
fn average_confidence_is_the_rounded_mean_over_all_groups() {
    init_logging();
    let payload = payload_with(vec![
        ("high", vec![contradiction(80.0), contradiction(60.0)]),
        ("low", vec![contradiction(100.0)]),
    ]);
    let view = ResultView::from_payload(&payload, false, 3);
    assert_eq!(view.average_confidence_percent, 80);
}

#[test]
fn no_contradictions_means_zero_average() {
    init_logging();
    let payload = payload_with(vec![]);
    let view = ResultView::from_payload(&payload, false, 1);
    assert_eq!(view.average_confidence_percent, 0);
    assert_eq!(view.total_clauses, 42);
}

#[test]
fn severity_groups_come_out_high_to_low_with_empty_groups_present() {
    init_logging();
    let payload = payload_with(vec![("low", vec![contradiction(50.0)])]);
    let view = ResultView::from_payload(&payload, false, 1);
    let order: Vec<Severity> = view
        .grouped_by_severity
        .iter()
        .map(|(severity, _)| *severity)
        .collect();
    assert_eq!(order, vec![Severity::High, Severity::Medium, Severity::Low]);
    assert!(view.grouped_by_severity[0].1.is_empty());
    assert_eq!(view.grouped_by_severity[2].1.len(), 1);
}

#[test]
fn unknown_severity_keys_fall_back_to_medium() {
    init_logging();
    let payload = payload_with(vec![("critical", vec![contradiction(70.0)])]);
    let view = ResultView::from_payload(&payload, false, 1);
    assert_eq!(view.grouped_by_severity[1].1.len(), 1);
    assert_eq!(view.grouped_by_severity[1].1[0].severity, Severity::Medium);
}

#[test]
fn backend_duration_wins_over_the_iteration_estimate() {
    init_logging();
    let mut payload = payload_with(vec![]);
    payload.analysis_duration = Some(12.34);
    let view = ResultView::from_payload(&payload, false, 99);
    assert_eq!(view.analysis_duration_label, "12.3s");

    payload.analysis_duration = None;
    let view = ResultView::from_payload(&payload, false, 99);
    assert_eq!(view.analysis_duration_label, "~99s");
}

#[test]
fn single_document_records_are_labeled_by_clause() {
    init_logging();
    let mut record = contradiction(90.0);
    record.clause_a = Some(RawClause {
        id: "c-17".to_string(),
        text: Some("Payment due in 30 days.".to_string()),
    });
    let payload = payload_with(vec![("high", vec![record])]);
    let view = ResultView::from_payload(&payload, false, 1);
    let normalized = &view.grouped_by_severity[0].1[0];
    assert_eq!(normalized.source_a_label, "Clause c-17");
    assert_eq!(normalized.source_b_label, "Source B");
    assert_eq!(normalized.text_a.as_deref(), Some("Payment due in 30 days."));
    assert_eq!(normalized.explanation, "amounts disagree");
}

#[test]
fn comparison_records_are_labeled_by_document_name() {
    init_logging();
    let mut record = contradiction(75.0);
    record.document_a = Some(RawDocumentInfo {
        id: "d-1".to_string(),
        name: "master.pdf".to_string(),
    });
    let mut payload = payload_with(vec![("medium", vec![record])]);
    payload.documents = Some(vec![
        RawDocumentInfo {
            id: "d-1".to_string(),
            name: "master.pdf".to_string(),
        },
        RawDocumentInfo {
            id: "d-2".to_string(),
            name: "addendum.pdf".to_string(),
        },
    ]);
    let view = ResultView::from_payload(&payload, true, 1);
    assert!(view.is_multi_doc);
    assert_eq!(
        view.compared_documents,
        Some(vec!["master.pdf".to_string(), "addendum.pdf".to_string()])
    );
    let normalized = &view.grouped_by_severity[1].1[0];
    assert_eq!(normalized.source_a_label, "master.pdf");
    assert_eq!(normalized.source_b_label, "Unknown");
}

#[test]
fn result_received_installs_the_view_once() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::LocalFileAdded {
            name: "contract.pdf".to_string(),
            size_bytes: 64,
            payload: vec![1],
        },
    );
    let (state, _) = update(state, Msg::StartClicked);
    let run_id = state.run_id();
    let (state, _) = update(
        state,
        Msg::JobSubmitted {
            run_id,
            handle: JobHandle::SingleDocument {
                document_id: "doc-1".to_string(),
                created_at: SystemTime::UNIX_EPOCH,
            },
        },
    );
    let (state, _) = update(
        state,
        Msg::StatusReceived {
            run_id,
            status: JobStatus::Completed,
            stage_token: Some("completed".to_string()),
            percent: Some(100),
            error_message: None,
        },
    );
    let payload = payload_with(vec![("high", vec![contradiction(88.0)])]);
    let (state, effects) = update(state, Msg::ResultReceived { run_id, payload });
    assert!(effects.is_empty());
    assert_eq!(state.progress().phase, RunPhase::Succeeded);
    let result = state.view().result.expect("result installed");
    assert_eq!(result.total_contradictions, 1);
    assert_eq!(result.average_confidence_percent, 88);
    // One poll response was consumed before completion.
    assert_eq!(result.analysis_duration_label, "~1s");
}

#[test]
fn stale_result_payload_is_ignored() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::LocalFileAdded {
            name: "contract.pdf".to_string(),
            size_bytes: 64,
            payload: vec![1],
        },
    );
    let (state, _) = update(state, Msg::StartClicked);
    let stale_run = state.run_id();
    let (state, _) = update(state, Msg::ResetClicked);

    let before = state.clone();
    let payload = payload_with(vec![("high", vec![contradiction(99.0)])]);
    let (state, effects) = update(
        state,
        Msg::ResultReceived {
            run_id: stale_run,
            payload,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);
    assert!(state.view().result.is_none());
}
