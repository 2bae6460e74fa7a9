use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    models::ValidationError,
    response::{ApiResponse, Meta},
    services::{DataError, DataErrorKind},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad Request: {0}")]
    Invalid(#[from] ValidationError),

    #[error("{0}")]
    Data(#[from] DataError),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
    kind: Option<DataErrorKind>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Invalid(_) => StatusCode::BAD_REQUEST,
            AppError::Data(err) => match err.kind() {
                DataErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
                DataErrorKind::SchemaMismatch => StatusCode::INTERNAL_SERVER_ERROR,
                DataErrorKind::NotFound => StatusCode::NOT_FOUND,
                DataErrorKind::Unknown => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, kind) = match &self {
            AppError::Invalid(_) => ("Bad Request".to_string(), None),
            AppError::Data(err) => (
                status.canonical_reason().unwrap_or("Error").to_string(),
                Some(err.kind()),
            ),
        };

        let body = ApiResponse {
            message,
            data: Some(ErrorData {
                error: self.to_string(),
                kind,
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
