use crate::common::response::ApiError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    /// No credentials were presented.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Credentials were presented but did not verify.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Transcoding failed: {0}")]
    Encoding(String),

    #[error("Database error")]
    Persistence(#[from] sqlx::Error),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Encoding(_) => StatusCode::BAD_REQUEST,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .collect::<Vec<_>>()
            .join(", ");

        if message.is_empty() {
            AppError::Validation("Invalid request".to_string())
        } else {
            AppError::Validation(message)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Persistence(e) => error!("Database error: {}", e),
            AppError::Internal(e) => error!("Internal error: {:#}", e),
            _ => {}
        }

        ApiError(self.to_string(), self.status()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Form {
        #[validate(length(min = 1, message = "Title is required"))]
        title: String,
    }

    #[test]
    fn taxonomy_maps_to_http_status() {
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Encoding("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Persistence(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_errors_keep_field_messages() {
        let err: AppError = Form { title: String::new() }.validate().unwrap_err().into();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Title is required"));
    }

    #[tokio::test]
    async fn error_renders_json_envelope() {
        let response = AppError::NotFound("Video not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Video not found");
        assert!(json["data"].is_null());
    }
}
