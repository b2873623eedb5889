//! Per-session duplicate submission guard.
//!
//! Each visitor carries a [`SubmissionSession`] inside their cookie session:
//! a random token sent with the insert, plus a flag that is set once a
//! submission for that token is known to exist. Handlers load it explicitly
//! at the start of a request, pass it into the admission flow and write it
//! back when it changed.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::debug;
use uuid::Uuid;

use crate::entity::submission;
use crate::error::StoreError;
use crate::submission_store::SubmissionRepository;

const SESSION_KEY: &str = "submission";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionSession {
    pub session_id: String,
    pub has_submitted: bool,
}

impl SubmissionSession {
    /// A fresh session with a random token.
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            has_submitted: false,
        }
    }

    /// Reads the guard state from `session`, creating and storing it on first use.
    pub async fn load(session: &Session) -> Result<Self, tower_sessions::session::Error> {
        if let Some(existing) = session.get::<Self>(SESSION_KEY).await? {
            return Ok(existing);
        }

        let fresh = Self::new();
        fresh.save(session).await?;
        Ok(fresh)
    }

    /// Writes the guard state back into `session`.
    pub async fn save(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(SESSION_KEY, self).await
    }

    /// Sets the flag in memory; follow with [`save`](Self::save) to keep it.
    pub fn mark_submitted(&mut self) {
        self.has_submitted = true;
    }
}

impl Default for SubmissionSession {
    fn default() -> Self {
        Self::new()
    }
}

/// True when any of `rows` was submitted under `session_id`.
pub fn already_submitted(session_id: &str, rows: &[submission::Model]) -> bool {
    rows.iter()
        .any(|row| row.session_id.as_deref() == Some(session_id))
}

/// Looks the session up in the store and sets its flag when a row exists.
///
/// Returns the resulting flag. No lookup happens when the flag is already set.
pub async fn check_existing(
    store: &dyn SubmissionRepository,
    client: &mut SubmissionSession,
) -> Result<bool, StoreError> {
    if client.has_submitted {
        return Ok(true);
    }

    let rows = store.find_by_session_id(&client.session_id).await?;
    if already_submitted(&client.session_id, &rows) {
        debug!(session_id = %client.session_id, "found earlier submission for session");
        client.mark_submitted();
    }

    Ok(client.has_submitted)
}
