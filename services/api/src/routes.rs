use crate::infra::{deserialize_date, deserialize_optional_date, evaluation_instant, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::NaiveDate;
use referral_engine::workflows::intake::{
    calculate_score, intake_router, qualifies_for_assignment, CaseAttributes, IncidentType,
    InjurySeverity, IntakeService, Notifier, PartnerDirectory, ScoringResult,
    SubmissionRepository,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Bare case attributes for a score preview. Nothing is stored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoreRequest {
    pub(crate) incident_type: String,
    pub(crate) injury_severity: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) medical_treatment: bool,
    #[serde(default)]
    pub(crate) hospitalized: bool,
    #[serde(default)]
    pub(crate) has_insurance: bool,
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) incident_date: NaiveDate,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoreResponse {
    pub(crate) scored_on: NaiveDate,
    pub(crate) qualifies_for_assignment: bool,
    #[serde(flatten)]
    pub(crate) result: ScoringResult,
}

pub(crate) fn with_intake_routes<R, P, N>(service: Arc<IntakeService<R, P, N>>) -> axum::Router
where
    R: SubmissionRepository + 'static,
    P: PartnerDirectory + 'static,
    N: Notifier + 'static,
{
    intake_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/score", axum::routing::post(score_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn score_endpoint(Json(payload): Json<ScoreRequest>) -> Json<ScoreResponse> {
    let ScoreRequest {
        incident_type,
        injury_severity,
        description,
        medical_treatment,
        hospitalized,
        has_insurance,
        incident_date,
        today,
    } = payload;

    let now = evaluation_instant(today);
    let attributes = CaseAttributes {
        incident_type: IncidentType::parse(&incident_type),
        injury_severity: InjurySeverity::parse(&injury_severity),
        description,
        medical_treatment,
        hospitalized,
        has_insurance,
        incident_date,
    };
    let result = calculate_score(&attributes, now);

    Json(ScoreResponse {
        scored_on: now.date_naive(),
        qualifies_for_assignment: qualifies_for_assignment(result.keeper_grade),
        result,
    })
}
