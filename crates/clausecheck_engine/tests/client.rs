use std::time::Duration;

use clausecheck_core::JobStatus;
use clausecheck_engine::{ApiError, BackendClient, ClientSettings, ReqwestBackendClient};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReqwestBackendClient {
    let settings = ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    };
    ReqwestBackendClient::new(settings).expect("client builds")
}

#[tokio::test]
async fn upload_returns_the_backend_id_and_sanitized_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "doc-42",
            "name": "contract.pdf",
            "status": "pending",
            "upload_date": "2026-01-01T00:00:00Z",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let uploaded = client
        .upload_document("contract.pdf", b"%PDF-1.4".to_vec())
        .await
        .expect("upload ok");
    assert_eq!(uploaded.id, "doc-42");
    assert_eq!(uploaded.name, "contract.pdf");
}

#[tokio::test]
async fn bearer_token_is_attached_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze/single"))
        .and(query_param("document_id", "doc-1"))
        .and(header("authorization", "Bearer sesame"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Analysis started",
            "document_id": "doc-1",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = ClientSettings {
        base_url: server.uri(),
        bearer_token: Some("sesame".to_string()),
        ..ClientSettings::default()
    };
    let client = ReqwestBackendClient::new(settings).expect("client builds");
    client
        .start_single_analysis("doc-1")
        .await
        .expect("start ok");
}

#[tokio::test]
async fn single_document_poll_reads_the_document_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/documents/doc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "doc-1",
            "name": "contract.pdf",
            "status": "processing",
            "processing_stage": "ner",
            "progress_percent": 55,
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let report = client.poll_status("doc-1", false).await.expect("poll ok");
    assert_eq!(report.status, JobStatus::Processing);
    assert_eq!(report.stage_token.as_deref(), Some("ner"));
    assert_eq!(report.percent, Some(55));
    assert_eq!(report.error_message, None);
}

#[tokio::test]
async fn comparison_poll_carries_the_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/comparison/cmp-7/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "comparison_id": "cmp-7",
            "status": "failed",
            "processing_stage": "nli",
            "progress_percent": 70,
            "error_message": "model crashed",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let report = client.poll_status("cmp-7", true).await.expect("poll ok");
    assert_eq!(report.status, JobStatus::Failed);
    assert_eq!(report.error_message.as_deref(), Some("model crashed"));
}

#[tokio::test]
async fn unknown_status_token_counts_as_still_running() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/documents/doc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "reticulating",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let report = client.poll_status("doc-1", false).await.expect("poll ok");
    assert_eq!(report.status, JobStatus::Processing);
}

#[tokio::test]
async fn fastapi_detail_is_surfaced_on_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents/upload"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Unsupported file type '.exe'. Allowed: .pdf, .docx, .txt",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .upload_document("payload.exe", vec![0u8; 8])
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 400,
            detail: "Unsupported file type '.exe'. Allowed: .pdf, .docx, .txt".to_string(),
        }
    );
}

#[tokio::test]
async fn non_json_error_bodies_fall_back_to_the_status_phrase() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/documents/doc-1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.poll_status("doc-1", false).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 503,
            detail: "Service Unavailable".to_string(),
        }
    );
}

#[tokio::test]
async fn slow_responses_map_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/documents/doc-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"status": "processing"})),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::default()
    };
    let client = ReqwestBackendClient::new(settings).expect("client builds");
    let err = client.poll_status("doc-1", false).await.unwrap_err();
    assert_eq!(err, ApiError::Timeout);
}

#[tokio::test]
async fn fetch_result_decodes_the_grouped_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/comparison/cmp-7/results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "comparison_id": "cmp-7",
            "status": "completed",
            "documents": [
                {"id": "d-1", "name": "master.pdf"},
                {"id": "d-2", "name": "addendum.pdf"},
            ],
            "total_clauses": 120,
            "total_contradictions": 2,
            "analysis_duration": 41.5,
            "contradictions_by_severity": {
                "high": [{
                    "id": "x-1",
                    "type": "numeric",
                    "severity": "high",
                    "description": "amounts disagree",
                    "confidence": 88.0,
                    "document_a": {"id": "d-1", "name": "master.pdf"},
                    "document_b": {"id": "d-2", "name": "addendum.pdf"},
                    "clause_a": {"id": "c-1", "text": "Fee is 5%."},
                    "clause_b": {"id": "c-9", "text": "Fee is 7%."},
                }],
                "medium": [],
                "low": [{
                    "id": "x-2",
                    "type": "modal",
                    "severity": "low",
                    "description": "may vs must",
                    "confidence": 60.0,
                    "clause_a": null,
                    "clause_b": null,
                }],
            },
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let payload = client.fetch_result("cmp-7", true).await.expect("fetch ok");
    assert_eq!(payload.total_clauses, 120);
    assert_eq!(payload.total_contradictions, 2);
    assert_eq!(payload.analysis_duration, Some(41.5));
    assert_eq!(payload.documents.as_ref().map(Vec::len), Some(2));
    let high = &payload.contradictions_by_severity["high"];
    assert_eq!(high[0].kind.as_deref(), Some("numeric"));
    assert_eq!(high[0].confidence, Some(88.0));
    assert_eq!(
        high[0].clause_b.as_ref().and_then(|c| c.text.as_deref()),
        Some("Fee is 7%.")
    );
}
