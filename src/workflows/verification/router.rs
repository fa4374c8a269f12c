use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AccountRole, VerificationFailure};
use super::notifier::VerificationNotifier;
use super::registration::{
    AccountDirectory, AccountRecord, RegistrationError, RegistrationRequest, RegistrationService,
};
use super::store::VerificationStore;

type SharedRegistration<S, N, D> = Arc<RegistrationService<S, N, D>>;

/// Body of the verify endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub otp: Option<String>,
}

/// Body of the recruiter login endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Router builder exposing registration and verification endpoints for both account types.
pub fn registration_router<S, N, D>(service: SharedRegistration<S, N, D>) -> Router
where
    S: VerificationStore + 'static,
    N: VerificationNotifier + 'static,
    D: AccountDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/students/register",
            post(student_register_handler::<S, N, D>),
        )
        .route(
            "/api/v1/students/verify",
            post(student_verify_handler::<S, N, D>),
        )
        .route(
            "/api/v1/recruiters/register",
            post(recruiter_register_handler::<S, N, D>),
        )
        .route(
            "/api/v1/recruiters/verify",
            post(recruiter_verify_handler::<S, N, D>),
        )
        .route(
            "/api/v1/recruiters/login",
            post(recruiter_login_handler::<S, N, D>),
        )
        .with_state(service)
}

pub(crate) async fn student_register_handler<S, N, D>(
    State(service): State<SharedRegistration<S, N, D>>,
    axum::Json(request): axum::Json<RegistrationRequest>,
) -> Response
where
    S: VerificationStore + 'static,
    N: VerificationNotifier + 'static,
    D: AccountDirectory + 'static,
{
    register(&service, AccountRole::Student, request)
}

pub(crate) async fn recruiter_register_handler<S, N, D>(
    State(service): State<SharedRegistration<S, N, D>>,
    axum::Json(request): axum::Json<RegistrationRequest>,
) -> Response
where
    S: VerificationStore + 'static,
    N: VerificationNotifier + 'static,
    D: AccountDirectory + 'static,
{
    register(&service, AccountRole::Recruiter, request)
}

pub(crate) async fn student_verify_handler<S, N, D>(
    State(service): State<SharedRegistration<S, N, D>>,
    axum::Json(request): axum::Json<VerifyRequest>,
) -> Response
where
    S: VerificationStore + 'static,
    N: VerificationNotifier + 'static,
    D: AccountDirectory + 'static,
{
    confirm(&service, AccountRole::Student, request)
}

pub(crate) async fn recruiter_verify_handler<S, N, D>(
    State(service): State<SharedRegistration<S, N, D>>,
    axum::Json(request): axum::Json<VerifyRequest>,
) -> Response
where
    S: VerificationStore + 'static,
    N: VerificationNotifier + 'static,
    D: AccountDirectory + 'static,
{
    confirm(&service, AccountRole::Recruiter, request)
}

pub(crate) async fn recruiter_login_handler<S, N, D>(
    State(service): State<SharedRegistration<S, N, D>>,
    axum::Json(request): axum::Json<LoginRequest>,
) -> Response
where
    S: VerificationStore + 'static,
    N: VerificationNotifier + 'static,
    D: AccountDirectory + 'static,
{
    match service.authenticate_recruiter(request.email, request.password) {
        Ok(record) => {
            let payload = json!({
                "message": "Login successful!",
                "recruiter_id": record.id,
                "name": record.name,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

fn register<S, N, D>(
    service: &RegistrationService<S, N, D>,
    role: AccountRole,
    request: RegistrationRequest,
) -> Response
where
    S: VerificationStore + 'static,
    N: VerificationNotifier + 'static,
    D: AccountDirectory + 'static,
{
    match service.register(role, request) {
        Ok(pending) => {
            let payload = json!({
                "message": "OTP sent to your email. Please check your inbox and verify.",
                "email": pending.email,
                "role": pending.role,
                "expires_at": pending.expires_at,
            });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

fn confirm<S, N, D>(
    service: &RegistrationService<S, N, D>,
    role: AccountRole,
    request: VerifyRequest,
) -> Response
where
    S: VerificationStore + 'static,
    N: VerificationNotifier + 'static,
    D: AccountDirectory + 'static,
{
    match service.confirm(role, request.email, request.otp) {
        Ok(record) => (StatusCode::CREATED, axum::Json(account_view(&record))).into_response(),
        Err(err) => error_response(err),
    }
}

fn account_view(record: &AccountRecord) -> serde_json::Value {
    json!({
        "message": "Registration successful! Welcome to SkillFit!",
        "account_id": record.id,
        "role": record.role,
        "name": record.name,
    })
}

pub(crate) fn error_response(err: RegistrationError) -> Response {
    let status = match &err {
        RegistrationError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RegistrationError::AlreadyRegistered => StatusCode::CONFLICT,
        RegistrationError::Verification(VerificationFailure::NotFound) => StatusCode::NOT_FOUND,
        RegistrationError::Verification(VerificationFailure::Expired) => StatusCode::GONE,
        RegistrationError::Verification(VerificationFailure::Invalid) => StatusCode::BAD_REQUEST,
        RegistrationError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        RegistrationError::Issue(_) | RegistrationError::Directory(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let mut payload = json!({ "error": err.to_string() });
    if let RegistrationError::Verification(failure) = &err {
        payload["reason"] = json!(failure.label());
        payload["retryable"] = json!(failure.is_retryable());
    }
    (status, axum::Json(payload)).into_response()
}
