use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use job_metrics::MetricsError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct JsonError {
    message: String,
    r#type: String,
}

#[derive(Serialize)]
struct JsonErrorWrapper {
    error: JsonError,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Metrics(MetricsError::Upstream { .. })
            | AppError::Metrics(MetricsError::Http(_)) => StatusCode::BAD_GATEWAY,
            AppError::Metrics(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_type = match self {
            AppError::NotFound(_) => "not_found",
            _ => "api_error",
        };
        HttpResponse::build(self.status_code()).json(JsonErrorWrapper {
            error: JsonError {
                message: self.to_string(),
                r#type: error_type.to_string(),
            },
        })
    }
}
