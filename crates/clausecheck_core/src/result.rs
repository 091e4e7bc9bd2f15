use std::collections::HashMap;

use serde::Deserialize;

/// Severity buckets in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    /// The backend defaults missing severities to medium; so do we.
    pub fn from_token(token: &str) -> Severity {
        match token {
            "high" => Severity::High,
            "low" => Severity::Low,
            _ => Severity::Medium,
        }
    }
}

/// Raw terminal payload as returned by the result-fetch endpoints.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawAnalysisPayload {
    #[serde(default)]
    pub contradictions_by_severity: HashMap<String, Vec<RawContradiction>>,
    #[serde(default)]
    pub total_contradictions: u32,
    #[serde(default)]
    pub total_clauses: u32,
    #[serde(default)]
    pub analysis_duration: Option<f64>,
    /// Present for comparison results only.
    #[serde(default)]
    pub documents: Option<Vec<RawDocumentInfo>>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawContradiction {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub clause_a: Option<RawClause>,
    #[serde(default)]
    pub clause_b: Option<RawClause>,
    #[serde(default)]
    pub document_a: Option<RawDocumentInfo>,
    #[serde(default)]
    pub document_b: Option<RawDocumentInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawClause {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawDocumentInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// One contradiction, normalized for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ContradictionRecord {
    pub kind: String,
    pub severity: Severity,
    pub confidence_percent: u32,
    pub source_a_label: String,
    pub source_b_label: String,
    pub text_a: Option<String>,
    pub text_b: Option<String>,
    pub explanation: String,
}

/// Immutable, display-ready view of a terminal run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub total_contradictions: u32,
    pub total_clauses: u32,
    pub average_confidence_percent: u32,
    pub analysis_duration_label: String,
    /// All three severities, high to low; empty groups stay present.
    pub grouped_by_severity: Vec<(Severity, Vec<ContradictionRecord>)>,
    pub is_multi_doc: bool,
    pub compared_documents: Option<Vec<String>>,
}

impl ResultView {
    /// Normalizes a raw terminal payload. `iterations` is the number of poll
    /// responses the run consumed; it stands in for the duration when the
    /// backend did not report one (an approximation, not wall clock).
    pub fn from_payload(payload: &RawAnalysisPayload, is_multi_doc: bool, iterations: u32) -> Self {
        let mut buckets: [Vec<ContradictionRecord>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for (group, records) in &payload.contradictions_by_severity {
            let severity = Severity::from_token(group);
            let bucket = &mut buckets[severity as usize];
            for raw in records {
                bucket.push(normalize_record(raw, severity, is_multi_doc));
            }
        }

        let record_count: usize = buckets.iter().map(Vec::len).sum();
        let average_confidence_percent = if record_count == 0 {
            0
        } else {
            let sum: f64 = payload
                .contradictions_by_severity
                .values()
                .flatten()
                .map(|raw| raw.confidence.unwrap_or(0.0))
                .sum();
            (sum / record_count as f64).round() as u32
        };

        let [high, medium, low] = buckets;
        Self {
            total_contradictions: payload.total_contradictions,
            total_clauses: payload.total_clauses,
            average_confidence_percent,
            analysis_duration_label: duration_label(payload.analysis_duration, iterations),
            grouped_by_severity: vec![
                (Severity::High, high),
                (Severity::Medium, medium),
                (Severity::Low, low),
            ],
            is_multi_doc,
            compared_documents: payload
                .documents
                .as_ref()
                .map(|docs| docs.iter().map(|doc| doc.name.clone()).collect()),
        }
    }

    /// Zero-count view installed on failure or timeout so the display never
    /// stays in a loading state.
    pub fn empty(is_multi_doc: bool, iterations: u32) -> Self {
        Self {
            total_contradictions: 0,
            total_clauses: 0,
            average_confidence_percent: 0,
            analysis_duration_label: duration_label(None, iterations),
            grouped_by_severity: Severity::ALL
                .into_iter()
                .map(|severity| (severity, Vec::new()))
                .collect(),
            is_multi_doc,
            compared_documents: None,
        }
    }
}

fn duration_label(reported: Option<f64>, iterations: u32) -> String {
    match reported {
        Some(seconds) => format!("{seconds:.1}s"),
        None => format!("~{iterations}s"),
    }
}

fn normalize_record(
    raw: &RawContradiction,
    severity: Severity,
    is_multi_doc: bool,
) -> ContradictionRecord {
    let (source_a_label, source_b_label) = if is_multi_doc {
        (document_label(&raw.document_a), document_label(&raw.document_b))
    } else {
        (
            clause_label(&raw.clause_a, "Source A"),
            clause_label(&raw.clause_b, "Source B"),
        )
    };
    ContradictionRecord {
        kind: raw.kind.clone().unwrap_or_else(|| "unknown".to_string()),
        severity,
        confidence_percent: raw.confidence.unwrap_or(0.0).round() as u32,
        source_a_label,
        source_b_label,
        text_a: raw.clause_a.as_ref().and_then(|clause| clause.text.clone()),
        text_b: raw.clause_b.as_ref().and_then(|clause| clause.text.clone()),
        explanation: raw.description.clone().unwrap_or_default(),
    }
}

fn document_label(document: &Option<RawDocumentInfo>) -> String {
    document
        .as_ref()
        .map(|doc| doc.name.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn clause_label(clause: &Option<RawClause>, fallback: &str) -> String {
    clause
        .as_ref()
        .map(|clause| format!("Clause {}", clause.id))
        .unwrap_or_else(|| fallback.to_string())
}
