//! HTTP surface for the student registry.
//!
//! - `GET /health` – Liveness probe, always `{"health":"ok"}`.
//! - `GET /` – Greeting, always `{"msg":"Hello World"}`.
//! - `POST /api/student` – Validate a student, insert it, read it back, and return it with its
//!   `id` (201). Schema violations yield 422 before the store is touched.
//! - `GET /api/student/:id` – Point lookup of a previously created student.
//!
//! Prometheus counters are served by a separate router (see [`create_metrics_router`]) so the
//! scrape endpoint can listen on its own port.

use crate::metrics::RequestMetrics;
use crate::store::{StoreError, StudentStore};
use crate::students::{
    MalformedIdentifier, Student, ValidationErrors, decode_id, encode_id, validate_new_student,
};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use mongodb::bson::oid::ObjectId;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// Shared handles injected into every handler.
struct AppState<S> {
    store: Arc<S>,
    metrics: Arc<RequestMetrics>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Build the HTTP router exposing the student API.
pub fn create_router<S>(store: Arc<S>, metrics: Arc<RequestMetrics>) -> Router
where
    S: StudentStore + 'static,
{
    Router::new()
        .route("/", get(read_main::<S>))
        .route("/health", get(health_check::<S>))
        .route("/api/student", post(create_student::<S>))
        .route("/api/student/:id", get(read_student::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { store, metrics })
}

/// Build the router serving `GET /metrics` in Prometheus text format.
pub fn create_metrics_router(metrics: Arc<RequestMetrics>) -> Router {
    Router::new()
        .route("/metrics", get(export_metrics))
        .with_state(metrics)
}

async fn read_main<S>(State(state): State<AppState<S>>) -> (StatusCode, Json<Value>)
where
    S: StudentStore,
{
    tracing::info!("Main endpoint called");
    state.metrics.record_main();
    (StatusCode::OK, Json(json!({ "msg": "Hello World" })))
}

async fn health_check<S>(State(state): State<AppState<S>>) -> (StatusCode, Json<Value>)
where
    S: StudentStore,
{
    tracing::info!("Healthcheck endpoint called");
    state.metrics.record_health();
    (StatusCode::OK, Json(json!({ "health": "ok" })))
}

/// Create a student.
///
/// Performs one insert and one read-back. The read-back returns the document exactly as stored,
/// and a document missing right after its insert is reported as a storage failure.
async fn create_student<S>(
    State(state): State<AppState<S>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>), ApiError>
where
    S: StudentStore,
{
    state.metrics.record_student_create();

    let Json(payload) = payload?;
    let student = validate_new_student(&payload)?;
    tracing::debug!(
        name = %student.name,
        course = %student.course,
        gpa = student.gpa,
        "Trying to add student"
    );

    let id = state.store.insert(&student).await?;
    let stored = state
        .store
        .find_by_id(id)
        .await
        .map_err(ApiError::Unavailable)?;

    tracing::debug!(id = %encode_id(&id), "Added student successfully");
    Ok((StatusCode::CREATED, Json(Student::from(stored))))
}

async fn read_student<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Student>, ApiError>
where
    S: StudentStore,
{
    state.metrics.record_request();

    let id = decode_id(&id)?;
    let stored = state.store.find_by_id(id).await?;
    Ok(Json(Student::from(stored)))
}

async fn export_metrics(State(metrics): State<Arc<RequestMetrics>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        metrics.render_prometheus(),
    )
}

/// Failures surfaced by the handlers, each mapped to one HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Payload broke a field rule (422).
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    /// Path id is not an `ObjectId` (400).
    #[error(transparent)]
    MalformedIdentifier(#[from] MalformedIdentifier),
    /// Point lookup found nothing (404).
    #[error("Student {} not found", encode_id(.0))]
    NotFound(ObjectId),
    /// Storage failed; details are logged, not returned (503).
    #[error("Student store failure: {0}")]
    Unavailable(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Unavailable(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(ValidationErrors::body(rejection.body_text(), "json_invalid"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(errors) => {
                tracing::debug!(errors = errors.errors.len(), "Rejected student payload");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "detail": errors.errors })),
                )
                    .into_response()
            }
            Self::MalformedIdentifier(error) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": error.to_string() })),
            )
                .into_response(),
            error @ Self::NotFound(_) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": error.to_string() })),
            )
                .into_response(),
            Self::Unavailable(error) => {
                tracing::error!(error = %error, "Student store request failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "detail": "Service unavailable" })),
                )
                    .into_response()
            }
        }
    }
}
