use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{SubmissionId, SubmissionMetadata};
use super::notifications::Notifier;
use super::repository::{PartnerDirectory, RepositoryError, SubmissionRepository};
use super::service::{IntakeService, IntakeServiceError};
use super::validation::IntakeForm;

const UNKNOWN: &str = "unknown";

/// Router builder exposing HTTP endpoints for intake submission and status checks.
pub fn intake_router<R, P, N>(service: Arc<IntakeService<R, P, N>>) -> Router
where
    R: SubmissionRepository + 'static,
    P: PartnerDirectory + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route("/api/intake", post(submit_handler::<R, P, N>))
        .route("/api/intake/:submission_id", get(status_handler::<R, P, N>))
        .with_state(service)
}

pub(crate) fn metadata_from_headers(headers: &HeaderMap) -> SubmissionMetadata {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    SubmissionMetadata {
        source: "web_form".to_string(),
        user_agent: header("user-agent").unwrap_or_else(|| UNKNOWN.to_string()),
        ip_address: header("x-forwarded-for")
            .or_else(|| header("x-real-ip"))
            .unwrap_or_else(|| UNKNOWN.to_string()),
    }
}

pub(crate) async fn submit_handler<R, P, N>(
    State(service): State<Arc<IntakeService<R, P, N>>>,
    headers: HeaderMap,
    axum::Json(form): axum::Json<IntakeForm>,
) -> Response
where
    R: SubmissionRepository + 'static,
    P: PartnerDirectory + 'static,
    N: Notifier + 'static,
{
    let metadata = metadata_from_headers(&headers);

    match service.submit(form, metadata) {
        Ok(receipt) => {
            let payload = json!({
                "success": true,
                "message": "Case submission received successfully",
                "submissionId": receipt.submission_id,
                "aiScore": receipt.ai_score,
                "keeperGrade": receipt.keeper_grade,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(IntakeServiceError::Validation(errors)) => {
            let payload = json!({
                "success": false,
                "message": "Validation failed",
                "errors": errors.0,
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => {
            tracing::error!(error = %other, "error processing intake submission");
            let payload = json!({
                "success": false,
                "message": "An error occurred while processing your submission. Please try again.",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn status_handler<R, P, N>(
    State(service): State<Arc<IntakeService<R, P, N>>>,
    Path(submission_id): Path<String>,
) -> Response
where
    R: SubmissionRepository + 'static,
    P: PartnerDirectory + 'static,
    N: Notifier + 'static,
{
    let id = SubmissionId(submission_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(IntakeServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "submissionId": id.0,
                "error": "submission not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
