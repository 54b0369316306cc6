use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

use crate::models::ErrorResponse;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Access denied")]
    AccessDenied,

    #[error("不支持的文件类型。")]
    UnsupportedFileType { file_name: String },

    #[error("Text extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("Document conversion timed out")]
    Timeout,

    #[error("Question parsing failed: {message}")]
    ParsingFailed { message: String },

    #[error("Failed to store questions: {message}")]
    PersistenceFailed { message: String },

    #[error("Invalid file: {message}")]
    InvalidFile { message: String },

    #[error("Upload too large: {message}")]
    PayloadTooLarge { message: String },

    #[error("Missing or invalid content type")]
    InvalidContentType,

    #[error("Missing file in request")]
    MissingFile,

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::AccessDenied => "ACCESS_DENIED",
            AppError::UnsupportedFileType { .. } => "UNSUPPORTED_FILE_TYPE",
            AppError::ExtractionFailed { .. } => "EXTRACTION_FAILED",
            AppError::Timeout => "CONVERSION_TIMEOUT",
            AppError::ParsingFailed { .. } => "PARSING_FAILED",
            AppError::PersistenceFailed { .. } => "PERSISTENCE_FAILED",
            AppError::InvalidFile { .. } => "INVALID_FILE",
            AppError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            AppError::InvalidContentType => "INVALID_CONTENT_TYPE",
            AppError::MissingFile => "MISSING_FILE",
            AppError::ValidationError { .. } => "VALIDATION_ERROR",
            AppError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::AccessDenied => StatusCode::UNAUTHORIZED,
            AppError::UnsupportedFileType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::ExtractionFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::ParsingFailed { .. } => StatusCode::BAD_GATEWAY,
            AppError::PersistenceFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidFile { .. } => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::InvalidContentType => StatusCode::BAD_REQUEST,
            AppError::MissingFile => StatusCode::BAD_REQUEST,
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();
        let error_id = Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                error_code = error_code,
                status_code = %status,
                error_id = %error_id,
                error_message = %message,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                error_code = error_code,
                status_code = %status,
                error_id = %error_id,
                error_message = %message,
                "Request rejected"
            );
        }

        let mut response = (status, Json(ErrorResponse { error: message })).into_response();
        response
            .headers_mut()
            .insert("x-error-code", HeaderValue::from_static(error_code));
        response
    }
}

// Convert common errors to AppError
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ValidationError {
            message: format!("JSON parsing error: {}", err),
        }
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        AppError::Timeout
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::PersistenceFailed {
            message: err.to_string(),
        }
    }
}

// Helper methods for creating specific errors
impl AppError {
    pub fn unsupported(file_name: impl Into<String>) -> Self {
        AppError::UnsupportedFileType {
            file_name: file_name.into(),
        }
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        AppError::ExtractionFailed {
            message: message.into(),
        }
    }

    pub fn parsing(message: impl Into<String>) -> Self {
        AppError::ParsingFailed {
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        AppError::PersistenceFailed {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }
}
