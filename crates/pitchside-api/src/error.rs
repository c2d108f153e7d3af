//! Pitchside API — error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pitchside_core::error::DomainError;
use pitchside_intake::error::IntakeError;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    /// The tracing pipeline could not be installed.
    #[error("telemetry error: {0}")]
    Telemetry(String),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Encounters left behind by a failed intake.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orphaned: Vec<Uuid>,
}

/// HTTP-layer wrapper around domain and intake errors.
#[derive(Debug)]
pub enum ApiError {
    /// An error from a bounded context or adapter.
    Domain(DomainError),
    /// An error from the intake workflow.
    Intake(IntakeError),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::Collaborator(inner) => Self::Domain(inner),
            other => Self::Intake(other),
        }
    }
}

fn domain_status(err: &DomainError) -> (StatusCode, &'static str) {
    match err {
        DomainError::AggregateNotFound(_) => (StatusCode::NOT_FOUND, "aggregate_not_found"),
        DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        DomainError::AlreadyExists(_) => (StatusCode::CONFLICT, "already_exists"),
        DomainError::ConcurrencyConflict { .. } => (StatusCode::CONFLICT, "concurrency_conflict"),
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        DomainError::Infrastructure(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
        }
    }
}

fn intake_status(err: &IntakeError) -> (StatusCode, &'static str) {
    match err {
        IntakeError::MissingPlayer => (StatusCode::UNPROCESSABLE_ENTITY, "missing_player"),
        IntakeError::NoModulesSelected => {
            (StatusCode::UNPROCESSABLE_ENTITY, "no_modules_selected")
        }
        IntakeError::ScheduledDateInPast { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "scheduled_date_in_past")
        }
        IntakeError::InvalidStage { .. } => (StatusCode::CONFLICT, "invalid_stage"),
        IntakeError::EncounterCreationFailed { .. } => {
            (StatusCode::BAD_GATEWAY, "encounter_creation_failed")
        }
        IntakeError::AlreadyCreating { .. } => (StatusCode::CONFLICT, "already_creating"),
        IntakeError::Collaborator(inner) => domain_status(inner),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::Domain(err) => domain_status(err),
            ApiError::Intake(err) => intake_status(err),
        };

        let (message, orphaned) = match self {
            ApiError::Domain(err) => (err.to_string(), Vec::new()),
            ApiError::Intake(IntakeError::EncounterCreationFailed {
                module, orphaned, ..
            }) => (
                format!("could not create the {module} encounter; please try again"),
                orphaned,
            ),
            ApiError::Intake(err) => (err.to_string(), Vec::new()),
        };

        let body = ErrorBody {
            error: error_code,
            message,
            orphaned,
        };

        (status, Json(body)).into_response()
    }
}
