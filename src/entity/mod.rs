//! Sea-ORM entity models.
//!
//! `submission` is the song submission table read and written by the form
//! and the viewer. `session` backs [`SeaOrmSessionStore`](crate::SeaOrmSessionStore).

/// Song submissions, one row per accepted form.
pub mod submission;

/// Persisted `tower-sessions` records.
pub mod session;
