use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{error, instrument, warn};

use crate::admin::{self, AdminGate};
use crate::admission::{self, Admission, AdmissionError};
use crate::api;
use crate::error::AppError;
use crate::guard::{self, SubmissionSession};
use crate::submission_store::SubmissionRepository;
use crate::validation::SubmissionForm;
use crate::views;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load submissions";
pub const INCORRECT_PASSWORD_MESSAGE: &str = "Incorrect password";

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub submissions: Arc<dyn SubmissionRepository>,
    pub admin: Arc<AdminGate>,
}

impl AppState {
    /// Wraps the submissions store and the admin gate for sharing across handlers.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use sea_orm::Database;
    /// use song_submissions::{router, AdminCredential, AdminGate, AppState, SeaOrmSubmissionStore};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = Database::connect("sqlite::memory:").await?;
    /// let admin = AdminGate::new(AdminCredential::parse("secret")?);
    /// let app = router(AppState::new(SeaOrmSubmissionStore::new(db), admin));
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(submissions: impl SubmissionRepository + 'static, admin: AdminGate) -> Self {
        Self {
            submissions: Arc::new(submissions),
            admin: Arc::new(admin),
        }
    }
}

/// All routes. Handlers expect a `SessionManagerLayer` to be added on top.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_form).post(submit_form))
        .route("/submissions", get(show_submissions).post(login))
        .route("/submissions/logout", post(logout))
        .route(
            "/api/submissions",
            get(api::list_submissions).post(api::create_submission),
        )
        .with_state(state)
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    password: String,
}

#[instrument(skip_all)]
async fn show_form(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    let mut client = SubmissionSession::load(&session).await?;

    if !client.has_submitted {
        match guard::check_existing(state.submissions.as_ref(), &mut client).await {
            Ok(true) => client.save(&session).await?,
            Ok(false) => {}
            Err(err) => warn!(error = %err, "session lookup failed, showing form"),
        }
    }

    if client.has_submitted {
        return Ok(views::thank_you_page(false).into_response());
    }

    Ok(views::form_page(&SubmissionForm::default(), None).into_response())
}

#[instrument(skip_all)]
async fn submit_form(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SubmissionForm>,
) -> Result<Response, AppError> {
    let mut client = SubmissionSession::load(&session).await?;

    match admission::admit(state.submissions.as_ref(), &mut client, &form).await {
        Ok(admission) => {
            client.save(&session).await?;
            let first_time = matches!(admission, Admission::Accepted(_));
            Ok(views::thank_you_page(first_time).into_response())
        }
        Err(err @ AdmissionError::Validation(_)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            views::form_page(&form, Some(&err.user_message())),
        )
            .into_response()),
        Err(err @ AdmissionError::Storage(_)) => {
            error!(error = %err, "failed to save submission");
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                views::form_page(&form, Some(&err.user_message())),
            )
                .into_response())
        }
    }
}

#[instrument(skip_all)]
async fn show_submissions(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    if !admin::is_authenticated(&session).await? {
        return Ok(views::login_page(None).into_response());
    }

    match state.submissions.list_recent().await {
        Ok(rows) => Ok(views::submissions_page(&rows).into_response()),
        Err(err) => {
            error!(error = %err, "failed to load submissions");
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                views::error_page(LOAD_FAILED_MESSAGE),
            )
                .into_response())
        }
    }
}

#[instrument(skip_all)]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if !state.admin.verify(&form.password) {
        warn!("rejected admin password");
        return Ok((
            StatusCode::UNAUTHORIZED,
            views::login_page(Some(INCORRECT_PASSWORD_MESSAGE)),
        )
            .into_response());
    }

    admin::grant(&session).await?;
    Ok(Redirect::to("/submissions").into_response())
}

async fn logout(session: Session) -> Result<Response, AppError> {
    admin::revoke(&session).await?;
    Ok(Redirect::to("/submissions").into_response())
}
