//! Song submission entity model.

use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, Set};
use serde::Serialize;

/// One accepted song submission.
///
/// | Column       | Type               | Description                             |
/// |--------------|--------------------|-----------------------------------------|
/// | id           | INTEGER (PK, auto) | Row identifier                          |
/// | name         | TEXT               | Submitter name, trimmed                 |
/// | song_name    | TEXT               | Song title, trimmed                     |
/// | spotify_link | TEXT               | Spotify track/album/playlist URL        |
/// | session_id   | TEXT NULL (unique) | Token of the session that submitted it  |
/// | created_at   | TIMESTAMPTZ        | Set on insert                           |
///
/// Rows are never updated or deleted by this crate.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "music_submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub song_name: String,

    #[sea_orm(column_type = "Text")]
    pub spotify_link: String,

    /// Unique across the table; `NULL` for rows inserted without a session.
    #[serde(skip_serializing)]
    pub session_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert && self.created_at.is_not_set() {
            self.created_at = Set(chrono::Utc::now().fixed_offset());
        }
        Ok(self)
    }
}
