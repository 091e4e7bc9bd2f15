use std::time::Duration;

use clausecheck_core::{JobStatus, RawAnalysisPayload};
use reqwest::StatusCode;

use crate::wire::{ComparisonRequest, ComparisonStarted, ErrorBody, StatusResponse, UploadResponse};

/// Connection settings for the analysis backend.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    /// Static bearer token; session management lives outside this crate.
    pub bearer_token: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            bearer_token: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("http status {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Upload confirmation; `name` is the sanitized name the backend stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub id: String,
    pub name: String,
}

/// One status poll round-trip, already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatusReport {
    pub status: JobStatus,
    pub stage_token: Option<String>,
    pub percent: Option<u8>,
    pub error_message: Option<String>,
}

/// Calls the core depends on, seam for tests and alternative transports.
#[async_trait::async_trait]
pub trait BackendClient: Send + Sync {
    async fn upload_document(
        &self,
        file_name: &str,
        payload: Vec<u8>,
    ) -> Result<UploadedDocument, ApiError>;

    async fn start_single_analysis(&self, document_id: &str) -> Result<(), ApiError>;

    /// Starts a comparison over `document_ids` in the given order; returns
    /// the comparison id.
    async fn start_comparison(&self, document_ids: &[String]) -> Result<String, ApiError>;

    async fn poll_status(&self, job_id: &str, comparison: bool)
        -> Result<JobStatusReport, ApiError>;

    async fn fetch_result(
        &self,
        job_id: &str,
        comparison: bool,
    ) -> Result<RawAnalysisPayload, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackendClient {
    client: reqwest::Client,
    settings: ClientSettings,
}

impl ReqwestBackendClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.settings.base_url.trim_end_matches('/'))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, self.url(path));
        if let Some(token) = &self.settings.bearer_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Turns a non-success response into `ApiError::Status`, surfacing the
    /// FastAPI `detail` field when the body carries one.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = match response.text().await {
            Ok(body) => serde_json::from_str::<ErrorBody>(&body)
                .map(|err| err.detail)
                .unwrap_or_else(|_| status_phrase(status)),
            Err(_) => status_phrase(status),
        };
        Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        })
    }
}

fn status_phrase(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("unexpected status")
        .to_string()
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    if err.is_decode() {
        return ApiError::Decode(err.to_string());
    }
    ApiError::Network(err.to_string())
}

#[async_trait::async_trait]
impl BackendClient for ReqwestBackendClient {
    async fn upload_document(
        &self,
        file_name: &str,
        payload: Vec<u8>,
    ) -> Result<UploadedDocument, ApiError> {
        let part = reqwest::multipart::Part::bytes(payload).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self
            .request(reqwest::Method::POST, "/api/documents/upload")
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: UploadResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(map_reqwest_error)?;
        Ok(UploadedDocument {
            id: body.id,
            name: body.name,
        })
    }

    async fn start_single_analysis(&self, document_id: &str) -> Result<(), ApiError> {
        let response = self
            .request(reqwest::Method::POST, "/api/analyze/single")
            .query(&[("document_id", document_id)])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn start_comparison(&self, document_ids: &[String]) -> Result<String, ApiError> {
        let response = self
            .request(reqwest::Method::POST, "/api/analyze/multi")
            .json(&ComparisonRequest { document_ids })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: ComparisonStarted = Self::check(response)
            .await?
            .json()
            .await
            .map_err(map_reqwest_error)?;
        Ok(body.comparison_id)
    }

    async fn poll_status(
        &self,
        job_id: &str,
        comparison: bool,
    ) -> Result<JobStatusReport, ApiError> {
        let path = if comparison {
            format!("/api/comparison/{job_id}/status")
        } else {
            format!("/api/documents/{job_id}")
        };
        let response = self
            .request(reqwest::Method::GET, &path)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: StatusResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(map_reqwest_error)?;
        Ok(JobStatusReport {
            status: JobStatus::from_token(&body.status),
            stage_token: body.processing_stage,
            percent: body.progress_percent,
            error_message: body.error_message,
        })
    }

    async fn fetch_result(
        &self,
        job_id: &str,
        comparison: bool,
    ) -> Result<RawAnalysisPayload, ApiError> {
        let path = if comparison {
            format!("/api/comparison/{job_id}/results")
        } else {
            format!("/api/documents/{job_id}/results")
        };
        let response = self
            .request(reqwest::Method::GET, &path)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(map_reqwest_error)
    }
}
