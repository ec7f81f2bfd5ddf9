use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the dashboard pipeline and its HTTP layer.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Artifact directory or one of the artifact files is absent.
    #[error("Model files not found. Please ensure model training is complete. (looked in {dir})")]
    ArtifactMissing { dir: PathBuf },

    /// Artifact present but unusable.
    #[error("Model artifact {path} is invalid: {reason}")]
    ArtifactInvalid { path: PathBuf, reason: String },

    #[error("Invalid student input: {0}")]
    InvalidInput(String),

    #[error("Invalid batch row {row}: {reason}")]
    InvalidBatch { row: usize, reason: String },

    /// The classifier could not produce a usable answer for this input.
    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Worker pool error: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),
}

impl DashboardError {
    pub fn invalid_artifact(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        DashboardError::ArtifactInvalid {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True when the model artifacts cannot be used for prediction.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            DashboardError::ArtifactMissing { .. } | DashboardError::ArtifactInvalid { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

impl ResponseError for DashboardError {
    fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::ArtifactMissing { .. } | DashboardError::ArtifactInvalid { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            DashboardError::InvalidInput(_) | DashboardError::InvalidBatch { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
