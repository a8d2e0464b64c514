//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use duet_db::DbError;

/// An error returned by an API handler. Everything except `Internal` is an
/// expected-path outcome returned to the caller as-is.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("not found: {0}")]
    NotFound(&'static str),

    /// State-machine transition attempted from an illegal source state.
    #[error("conflict: {0}")]
    InvalidState(&'static str),

    #[error("bad request: {0}")]
    BadRequest(&'static str),

    #[error("internal error: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::AccountNotFound(_) => ApiError::NotFound("account_not_found"),
            DbError::InvitationNotFound(_) => ApiError::NotFound("invitation_not_found"),
            DbError::AlreadyResolved(_) => ApiError::InvalidState("invitation_already_resolved"),
            DbError::AlreadyLinked(_) => ApiError::InvalidState("already_linked"),
            DbError::NotInvitee(_) => ApiError::Unauthorized,
            other => ApiError::Internal(Box::new(other)),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(Box::new(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reason) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Forbidden(r) => (StatusCode::FORBIDDEN, *r),
            ApiError::NotFound(r) => (StatusCode::NOT_FOUND, *r),
            ApiError::InvalidState(r) => (StatusCode::CONFLICT, *r),
            ApiError::BadRequest(r) => (StatusCode::BAD_REQUEST, *r),
            ApiError::Internal(e) => {
                error!("internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };
        (status, Json(json!({ "error": reason }))).into_response()
    }
}
