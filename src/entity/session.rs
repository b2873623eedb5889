//! Session entity model.
//!
//! Maps the `session` table used by [`SeaOrmSessionStore`](crate::SeaOrmSessionStore)
//! to hold the cookie sessions that carry each visitor's submission flag.

use sea_orm::entity::prelude::*;

/// A persisted session record.
///
/// | Column      | Type               | Description                          |
/// |-------------|--------------------|--------------------------------------|
/// | id          | TEXT (Primary Key) | Session ID                           |
/// | data        | BLOB / BYTEA       | MessagePack-encoded session record   |
/// | expiry_date | TIMESTAMPTZ        | Instant after which the row is stale |
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "session")]
pub struct Model {
    /// String form of `tower_sessions::session::Id`.
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,

    pub data: Vec<u8>,

    /// Rows past this instant are ignored by `load` and removed by `delete_expired`.
    pub expiry_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
