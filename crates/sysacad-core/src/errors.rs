//! Application error type.
//!
//! Every fallible domain operation returns [`AppError`]. The HTTP status carried
//! by the error is what the boundary renders; [`ErrorKind`] is the coarse
//! classification callers branch on.

use std::collections::BTreeMap;

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::ValidationErrors;

/// Coarse error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Field-level or cross-field rule violation. Fixed by correcting the input.
    Validation,
    /// The requested entity does not exist.
    NotFound,
    /// Uniqueness or referential-protection violation against current data.
    Conflict,
    /// A downstream collaborator (the academic service) could not answer.
    CollaboratorUnavailable,
    /// Anything else.
    Unexpected,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    /// Field-scoped messages, present for validation failures.
    pub fields: Option<ValidationErrors>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            fields: None,
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::CONFLICT, err)
    }

    pub fn service_unavailable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, err)
    }

    /// Wraps a set of field-scoped rule violations.
    pub fn validation(errors: ValidationErrors) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            error: anyhow::anyhow!("{}", format_errors(&errors)),
            fields: Some(errors),
        }
    }

    /// Classifies a storage error.
    ///
    /// Constraint violations raised by PostgreSQL are the backstop for races
    /// the domain pre-checks cannot see, so they surface as conflicts (unique,
    /// foreign key) or validation failures (check) rather than as 500s.
    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        let err: Error = err.into();

        let status = match err.downcast_ref::<sqlx::Error>() {
            Some(sqlx::Error::Database(db_err))
                if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
            {
                StatusCode::CONFLICT
            }
            Some(sqlx::Error::Database(db_err)) if db_err.is_check_violation() => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Some(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self::new(status, err)
    }

    pub fn kind(&self) -> ErrorKind {
        match self.status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::Validation,
            StatusCode::NOT_FOUND => ErrorKind::NotFound,
            StatusCode::CONFLICT => ErrorKind::Conflict,
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                ErrorKind::CollaboratorUnavailable
            }
            _ => ErrorKind::Unexpected,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// Joins every field message into a single human-readable line.
pub fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| error.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.kind() == ErrorKind::Unexpected {
            tracing::error!(error = ?self.error, "Unhandled error");
        }

        let body = match &self.fields {
            Some(fields) => Json(json!({
                "error": self.error.to_string(),
                "fields": field_messages(fields),
            })),
            None => Json(json!({
                "error": self.error.to_string()
            })),
        };

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}
