//! JSON variants of the form and the viewer.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::{error, instrument};

use crate::admin;
use crate::admission::{self, Admission, AdmissionError};
use crate::entity::submission;
use crate::error::AppError;
use crate::guard::SubmissionSession;
use crate::routes::{AppState, LOAD_FAILED_MESSAGE};
use crate::validation::SubmissionForm;

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitResponse {
    Accepted { submission: submission::Model },
    AlreadySubmitted,
}

#[instrument(skip_all)]
pub async fn create_submission(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<SubmissionForm>,
) -> Result<Response, AppError> {
    let mut client = SubmissionSession::load(&session).await?;

    let result = admission::admit(state.submissions.as_ref(), &mut client, &form).await;
    match result {
        Ok(Admission::Accepted(row)) => {
            client.save(&session).await?;
            Ok((
                StatusCode::CREATED,
                Json(SubmitResponse::Accepted { submission: row }),
            )
                .into_response())
        }
        Ok(Admission::AlreadySubmitted) => {
            client.save(&session).await?;
            Ok((StatusCode::CONFLICT, Json(SubmitResponse::AlreadySubmitted)).into_response())
        }
        Err(err) => {
            let status = match err {
                AdmissionError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AdmissionError::Storage(_) => {
                    error!(error = %err, "failed to save submission");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            Ok((status, Json(json!({ "error": err.user_message() }))).into_response())
        }
    }
}

#[instrument(skip_all)]
pub async fn list_submissions(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    if !admin::is_authenticated(&session).await? {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Authentication required" })),
        )
            .into_response());
    }

    match state.submissions.list_recent().await {
        Ok(rows) => Ok(Json(rows).into_response()),
        Err(err) => {
            error!(error = %err, "failed to load submissions");
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": LOAD_FAILED_MESSAGE })),
            )
                .into_response())
        }
    }
}
