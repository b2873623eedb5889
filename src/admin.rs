//! Password gate in front of the submissions viewer.

use argon2::{
    password_hash::{PasswordHash, PasswordVerifier},
    Argon2,
};
use subtle::ConstantTimeEq;
use tower_sessions::Session;
use tracing::warn;

const ADMIN_KEY: &str = "admin_authenticated";

/// The configured admin password.
#[derive(Clone, PartialEq, Eq)]
pub enum AdminCredential {
    Plain(String),
    /// Argon2 PHC string, e.g. `$argon2id$v=19$...`.
    Argon2(String),
}

impl AdminCredential {
    /// Treats values in Argon2 PHC format as hashes and anything else as a plain password.
    pub fn parse(value: &str) -> Result<Self, argon2::password_hash::Error> {
        if value.starts_with("$argon2") {
            PasswordHash::new(value)?;
            Ok(Self::Argon2(value.to_string()))
        } else {
            Ok(Self::Plain(value.to_string()))
        }
    }
}

impl std::fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("AdminCredential::Plain(..)"),
            Self::Argon2(_) => f.write_str("AdminCredential::Argon2(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdminGate {
    credential: AdminCredential,
}

impl AdminGate {
    pub fn new(credential: AdminCredential) -> Self {
        Self { credential }
    }

    /// Exact match against the configured password.
    pub fn verify(&self, attempt: &str) -> bool {
        match &self.credential {
            AdminCredential::Plain(expected) => {
                bool::from(attempt.as_bytes().ct_eq(expected.as_bytes()))
            }
            AdminCredential::Argon2(hash) => match PasswordHash::new(hash) {
                Ok(parsed) => Argon2::default()
                    .verify_password(attempt.as_bytes(), &parsed)
                    .is_ok(),
                Err(err) => {
                    warn!(error = %err, "stored admin hash is unreadable");
                    false
                }
            },
        }
    }
}

/// Whether this session has passed the password gate.
///
/// A session that was never granted reads as `false`.
pub async fn is_authenticated(session: &Session) -> Result<bool, tower_sessions::session::Error> {
    Ok(session.get::<bool>(ADMIN_KEY).await?.unwrap_or(false))
}

/// Marks the session as admin, under a fresh session id.
///
/// Call only after [`AdminGate::verify`] accepted the password.
pub async fn grant(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(ADMIN_KEY, true).await
}

/// Clears the admin flag; the rest of the session, including the submission
/// guard, is kept.
pub async fn revoke(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<bool>(ADMIN_KEY).await?;
    Ok(())
}
