use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::identity::IdentityError;
use crate::repository::RepositoryError;

/// Error raised by job and application operations.
///
/// `NotFound` also covers records that exist but are hidden from the actor,
/// so callers cannot probe for records they are not allowed to see.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("authentication required")]
    Unauthenticated,
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error("permission denied: {0}")]
    PermissionDenied(&'static str),
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
    #[error("you have already applied to this job")]
    DuplicateApplication,
    #[error("{0} field is required for updates")]
    MissingRequiredField(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl BoardError {
    pub fn code(&self) -> &'static str {
        match self {
            BoardError::Unauthenticated => "not_authenticated",
            BoardError::Identity(err) => err.code(),
            BoardError::PermissionDenied(_) => "permission_denied",
            BoardError::NotFound { .. } => "not_found",
            BoardError::DuplicateApplication => "duplicate_application",
            BoardError::MissingRequiredField(_) => "missing_required_field",
            BoardError::Validation(_) => "validation_error",
            BoardError::Repository(_) => "storage_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BoardError::Unauthenticated => StatusCode::UNAUTHORIZED,
            BoardError::Identity(err) => err.status(),
            BoardError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            BoardError::NotFound { .. } => StatusCode::NOT_FOUND,
            BoardError::DuplicateApplication => StatusCode::CONFLICT,
            BoardError::MissingRequiredField(_) | BoardError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            BoardError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            BoardError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for BoardError {
    fn from(rejection: JsonRejection) -> Self {
        BoardError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for BoardError {
    fn from(rejection: PathRejection) -> Self {
        BoardError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for BoardError {
    fn from(rejection: QueryRejection) -> Self {
        BoardError::Validation(rejection.body_text())
    }
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        if let BoardError::Identity(err) = self {
            return err.into_response();
        }

        let status = self.status();
        let mut payload = json!({ "error": self.to_string(), "code": self.code() });
        if let BoardError::MissingRequiredField(field) = &self {
            payload["field"] = json!(field);
        }

        if status == StatusCode::UNAUTHORIZED {
            (
                status,
                [(WWW_AUTHENTICATE, "Basic realm=\"jobboard\"")],
                Json(payload),
            )
                .into_response()
        } else {
            (status, Json(payload)).into_response()
        }
    }
}
