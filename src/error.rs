/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - 認証エラー (AuthenticationError) を 401 に統一的に変換
 * - 読めなかった request body を 400 / 413 に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::AuthenticationError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },
    #[error("bad request: {message}")]
    BadRequest { message: String },
    #[error("payload too large: limit {limit} bytes")]
    PayloadTooLarge { limit: usize },
}

impl AppError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn payload_too_large(limit: usize) -> Self {
        Self::PayloadTooLarge { limit }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            AppError::NotFound { resource } => ("NOT_FOUND", format!("{resource} not found.")),
            AppError::Unauthorized { message } => ("UNAUTHORIZED", message),
            AppError::BadRequest { message } => ("BAD_REQUEST", message),
            AppError::PayloadTooLarge { limit } => (
                "PAYLOAD_TOO_LARGE",
                format!("request body exceeds {limit} bytes."),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<&AuthenticationError> for AppError {
    fn from(e: &AuthenticationError) -> Self {
        // Detailed reasons stay in the logs; clients get a stable message.
        match e {
            AuthenticationError::Expired => AppError::unauthorized("token expired"),
            AuthenticationError::ServiceUnavailable(_) => {
                AppError::unauthorized("authentication temporarily unavailable")
            }
            AuthenticationError::InvalidToken(_) | AuthenticationError::Disabled(_) => {
                AppError::unauthorized("invalid token")
            }
        }
    }
}
