use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Infrastructure failures surfaced as JSON banners. Scan outcomes
/// (recorded / duplicate / unknown code) are not errors and are mapped to
/// responses by the scan handlers directly.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid frame: {0}")]
    BadFrame(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadFrame(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "message": self.to_string() }))
    }
}
