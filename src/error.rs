use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;

use crate::views;

/// Shown for any failure that is neither a validation nor a storage problem.
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Failure of the submissions store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Request-level failure that aborts a handler.
///
/// Rendered as a generic page; the cause is only logged.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            views::error_page(UNEXPECTED_MESSAGE),
        )
            .into_response()
    }
}
