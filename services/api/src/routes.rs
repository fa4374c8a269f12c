use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use skillfit::workflows::assessment::{
    assessment_router, AssessmentService, JobDirectory, QuestionCatalog, ResultRepository,
};
use skillfit::workflows::verification::{
    registration_router, AccountDirectory, RegistrationService, VerificationNotifier,
    VerificationStore,
};
use std::sync::Arc;

pub(crate) fn with_skillfit_routes<S, N, D, Q, J, R>(
    registration: Arc<RegistrationService<S, N, D>>,
    assessment: Arc<AssessmentService<Q, J, R>>,
) -> axum::Router
where
    S: VerificationStore + 'static,
    N: VerificationNotifier + 'static,
    D: AccountDirectory + 'static,
    Q: QuestionCatalog + 'static,
    J: JobDirectory + 'static,
    R: ResultRepository + 'static,
{
    registration_router(registration)
        .merge(assessment_router(assessment))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
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
