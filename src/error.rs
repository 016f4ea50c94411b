use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;

/// Field name to human-readable problem, returned under `fields`.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, fields: FieldErrors },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Too many requests")]
    RateLimited,

    #[error(transparent)]
    Database(DbErr),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), message.clone());
        Self::Validation { message: format!("{field}: {message}"), fields }
    }

    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), fields: FieldErrors::new() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Unique-index violations surface as 409 conflicts.
impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::debug!(%detail, "unique constraint violated");
                Self::Conflict("Resource already exists".to_string())
            },
            _ => Self::Database(err),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: FieldErrors = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                let first = errs.first()?;
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("failed {} check", first.code));
                Some((field.to_string(), message))
            })
            .collect();

        let message = match fields.keys().next() {
            Some(field) => format!("invalid field: {field}"),
            None => "invalid request body".to_string(),
        };
        Self::Validation { message, fields }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Self::Validation { message, fields } => {
                tracing::debug!(error = %message, "rejected request");
                json!({ "success": false, "error": message, "fields": fields })
            },
            Self::Database(err) => {
                tracing::error!(error = %err, "database error");
                json!({ "success": false, "error": "Internal server error" })
            },
            Self::Internal(err) => {
                tracing::error!(error = ?err, "internal error");
                json!({ "success": false, "error": "Internal server error" })
            },
            other => {
                tracing::debug!(error = %other, status = %status, "client error");
                json!({ "success": false, "error": other.to_string() })
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Named {
        #[validate(length(min = 1, message = "must not be empty"))]
        name: String,
    }

    #[test]
    fn validation_errors_keep_field_detail() {
        let err: AppError = Named { name: String::new() }.validate().unwrap_err().into();
        match err {
            AppError::Validation { fields, .. } => {
                assert_eq!(fields.get("name").map(String::as_str), Some("must not be empty"));
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn server_errors_map_to_500() {
        let err = AppError::Internal(anyhow::anyhow!("disk on fire"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::NotFound("Movie").to_string(), "Movie not found");
    }
}
