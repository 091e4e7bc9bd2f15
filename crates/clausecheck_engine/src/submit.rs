use std::time::SystemTime;

use clausecheck_core::{AnalysisRequest, AnalysisType, DocumentRef, JobHandle};
use client_logging::{client_debug, client_info};

use crate::client::{ApiError, BackendClient};

/// Resolves document ids (uploading pending files strictly in selection
/// order) and starts the job. The first failed upload aborts the whole
/// submission; no partial job is ever started.
pub async fn run_submission(
    client: &dyn BackendClient,
    request: &AnalysisRequest,
) -> Result<JobHandle, ApiError> {
    let mut document_ids = Vec::with_capacity(request.documents.len());
    for document in &request.documents {
        match document {
            DocumentRef::Local(file) => {
                client_debug!("uploading '{}' ({} bytes)", file.name, file.size_bytes);
                let uploaded = client
                    .upload_document(&file.name, file.payload.clone())
                    .await?;
                client_info!("uploaded '{}' as document {}", uploaded.name, uploaded.id);
                document_ids.push(uploaded.id);
            }
            DocumentRef::Existing { document_id } => {
                document_ids.push(document_id.clone());
            }
        }
    }

    match request.analysis_type {
        AnalysisType::Single => {
            let document_id = document_ids.into_iter().next().ok_or_else(|| {
                ApiError::InvalidRequest("single analysis needs one document".to_string())
            })?;
            client.start_single_analysis(&document_id).await?;
            client_info!("single analysis started for document {document_id}");
            // The document id doubles as the job handle.
            Ok(JobHandle::SingleDocument {
                document_id,
                created_at: SystemTime::now(),
            })
        }
        AnalysisType::Multi => {
            let comparison_id = client.start_comparison(&document_ids).await?;
            client_info!(
                "comparison {comparison_id} started over {} documents",
                document_ids.len()
            );
            Ok(JobHandle::Comparison {
                comparison_id,
                created_at: SystemTime::now(),
            })
        }
    }
}
