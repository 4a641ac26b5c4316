// src/errors.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::email_service::{EmailDeliveryError, EmailErrorKind};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("MongoDB error: {0}")]
    MongoDB(#[from] mongodb::error::Error),

    #[error("BSON error: {0}")]
    Bson(#[from] mongodb::bson::ser::Error),

    #[error("Multipart error: {0}")]
    Multipart(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Uploaded file is not a supported image")]
    InvalidImageFormat,

    #[error("Uploaded file exceeds {0} bytes")]
    FileTooLarge(usize),

    #[error("Invalid ObjectId: {0}")]
    InvalidObjectId(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("OTP is invalid or has expired")]
    InvalidOrExpiredOtp,

    #[error(transparent)]
    EmailDelivery(#[from] EmailDeliveryError),

    #[error("{0}")]
    Unauthorized(String),

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("{0}")]
    ValidationError(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Multipart(_)
            | AppError::InvalidImageFormat
            | AppError::InvalidObjectId(_)
            | AppError::InvalidOrExpiredOtp
            | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::FileTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::EmailDelivery(e) => match e.kind {
                EmailErrorKind::SenderRejected | EmailErrorKind::AccessDenied => {
                    StatusCode::BAD_GATEWAY
                }
                EmailErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::MongoDB(_)
            | AppError::Bson(_)
            | AppError::Io(_)
            | AppError::Token(_)
            | AppError::PasswordHash(_)
            | AppError::ConfigurationError(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Infrastructure details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::MongoDB(_)
            | AppError::Bson(_)
            | AppError::Io(_)
            | AppError::Token(_)
            | AppError::PasswordHash(_)
            | AppError::ConfigurationError(_)
            | AppError::Internal(_) => "Something went wrong. Please try again later.".to_string(),
            AppError::InvalidObjectId(_) => "Invalid ID format".to_string(),
            AppError::Multipart(_) => "Invalid multipart data".to_string(),
            AppError::EmailDelivery(e) => e.kind.user_message().to_string(),
            other => other.to_string(),
        }
    }

    fn kind(&self) -> Option<&'static str> {
        match self {
            AppError::EmailDelivery(e) => Some(e.kind.as_str()),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        envelope(status, self.public_message(), self.kind())
    }
}

/// Uniform JSON error body shared by handlers, the 404 fallback and the panic catcher.
pub fn envelope(status: StatusCode, message: impl Into<String>, kind: Option<&str>) -> Response {
    let mut body = json!({
        "status": if status.is_server_error() { "error" } else { "fail" },
        "message": message.into(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    if let Some(kind) = kind {
        body["kind"] = json!(kind);
    }

    (status, Json(body)).into_response()
}

impl From<axum_extra::extract::multipart::MultipartError> for AppError {
    fn from(err: axum_extra::extract::multipart::MultipartError) -> Self {
        AppError::Multipart(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let message = err
            .field_errors()
            .values()
            .flat_map(|errors| errors.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .collect::<Vec<_>>()
            .join("; ");

        if message.is_empty() {
            AppError::ValidationError(format!("Validation failed: {}", err))
        } else {
            AppError::ValidationError(message)
        }
    }
}

impl From<mongodb::bson::oid::Error> for AppError {
    fn from(err: mongodb::bson::oid::Error) -> Self {
        AppError::InvalidObjectId(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("background task failed: {}", err))
    }
}

impl AppError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::ConfigurationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
