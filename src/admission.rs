//! Submission admission: guard, validation, re-check, insert.

use thiserror::Error;
use tracing::{info, instrument};

use crate::entity::submission;
use crate::error::StoreError;
use crate::guard::{self, SubmissionSession};
use crate::submission_store::{InsertOutcome, SubmissionRepository};
use crate::validation::{SubmissionForm, ValidationError};

/// Shown when the store could not be reached or refused the write.
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save your submission. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Accepted(submission::Model),
    /// The session already has a submission; nothing was written.
    AlreadySubmitted,
}

#[derive(Error, Debug)]
pub enum AdmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl AdmissionError {
    /// Text for the visitor; storage details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Storage(_) => SAVE_FAILED_MESSAGE.to_string(),
        }
    }
}

/// Runs one form submission for `client`.
///
/// On `Ok`, `client.has_submitted` is set and must be written back to the
/// cookie session by the caller.
#[instrument(skip_all, fields(session_id = %client.session_id))]
pub async fn admit(
    store: &dyn SubmissionRepository,
    client: &mut SubmissionSession,
    form: &SubmissionForm,
) -> Result<Admission, AdmissionError> {
    if client.has_submitted {
        return Ok(Admission::AlreadySubmitted);
    }

    let valid = form.validate()?;

    if guard::check_existing(store, client).await? {
        return Ok(Admission::AlreadySubmitted);
    }

    let outcome = store
        .insert(valid.into_new_submission(Some(client.session_id.clone())))
        .await?;
    client.mark_submitted();

    match outcome {
        InsertOutcome::Inserted(row) => {
            info!(id = row.id, song = %row.song_name, "submission accepted");
            Ok(Admission::Accepted(row))
        }
        InsertOutcome::DuplicateSession => Ok(Admission::AlreadySubmitted),
    }
}
