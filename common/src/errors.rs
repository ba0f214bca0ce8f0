//! Error taxonomy shared by the driver, the manager and the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::response::ErrorBody;

/// Result alias used across the service.
pub type AppResult<T> = Result<T, AppError>;

/// Application error.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The `type` of a connection config names no implemented dialect.
    #[error("unsupported database type: {0}")]
    UnsupportedDialect(String),

    /// Opening or pinging a database handle failed.
    #[error("failed to connect: {0}")]
    Connection(String),

    /// The referenced connection id is not registered.
    #[error("connection not found: {0}")]
    ConnectionNotFound(String),

    /// A statement, column introspection or row decode failed.
    #[error("execution failed: {0}")]
    Execution(String),

    /// A request body failed field validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A request body could not be parsed.
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ConnectionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::UnsupportedDialect(_)
            | AppError::Connection(_)
            | AppError::Execution(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is a [`AppError::ConnectionNotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::ConnectionNotFound(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
        }
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::ConnectionNotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UnsupportedDialect("oracle".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Connection("refused".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            AppError::ConnectionNotFound("abc".into()).to_string(),
            "connection not found: abc"
        );
        assert_eq!(
            AppError::UnsupportedDialect("oracle".into()).to_string(),
            "unsupported database type: oracle"
        );
        assert!(AppError::ConnectionNotFound("abc".into()).is_not_found());
        assert!(!AppError::Execution("boom".into()).is_not_found());
    }
}
