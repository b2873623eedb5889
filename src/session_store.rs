use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set, TransactionTrait,
};
use time::OffsetDateTime;
use tower_sessions::{session::Id, session::Record, session_store, ExpiredDeletion, SessionStore};
use tracing::debug;

use crate::entity::session::{self, ActiveModel as SessionActiveModel, Entity as SessionEntity};

/// Session store for `tower-sessions` on the application's own database.
///
/// Records live in the `session` table, MessagePack-encoded, next to the
/// submissions. Works on any SeaORM backend the crate is built with.
///
/// ```no_run
/// use sea_orm::Database;
/// use song_submissions::SeaOrmSessionStore;
/// use time::Duration;
/// use tower_sessions::{Expiry, SessionManagerLayer};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let conn = Database::connect("sqlite://songs.db?mode=rwc").await?;
/// let layer = SessionManagerLayer::new(SeaOrmSessionStore::new(conn))
///     .with_expiry(Expiry::OnInactivity(Duration::days(365)));
/// # Ok(())
/// # }
/// ```
///
/// Errors map onto `session_store::Error`: database failures become
/// `Backend`, encoding failures `Encode` and decoding failures `Decode`.
#[derive(Debug, Clone)]
pub struct SeaOrmSessionStore {
    conn: DatabaseConnection,
}

impl SeaOrmSessionStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

fn backend(err: DbErr) -> session_store::Error {
    session_store::Error::Backend(err.to_string())
}

fn encode(record: &Record) -> session_store::Result<(Vec<u8>, DateTimeWithTimeZone)> {
    let data =
        rmp_serde::to_vec(record).map_err(|e| session_store::Error::Encode(e.to_string()))?;
    Ok((data, to_db_time(record.expiry_date)?))
}

#[async_trait]
impl SessionStore for SeaOrmSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let txn = self.conn.begin().await.map_err(backend)?;

        // Ids are random; regenerate until unused
        while SessionEntity::find_by_id(record.id.to_string())
            .one(&txn)
            .await
            .map_err(backend)?
            .is_some()
        {
            debug!("session id collision, regenerating");
            record.id = Id::default();
        }

        let (data, expiry_date) = encode(record)?;
        SessionActiveModel {
            id: Set(record.id.to_string()),
            data: Set(data),
            expiry_date: Set(expiry_date),
        }
        .insert(&txn)
        .await
        .map_err(backend)?;

        txn.commit().await.map_err(backend)
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let (data, expiry_date) = encode(record)?;

        let existing = SessionEntity::find_by_id(record.id.to_string())
            .one(&self.conn)
            .await
            .map_err(backend)?;

        match existing {
            Some(row) => {
                let mut active = row.into_active_model();
                active.data = Set(data);
                active.expiry_date = Set(expiry_date);
                active.update(&self.conn).await.map_err(backend)?;
            }
            None => {
                SessionActiveModel {
                    id: Set(record.id.to_string()),
                    data: Set(data),
                    expiry_date: Set(expiry_date),
                }
                .insert(&self.conn)
                .await
                .map_err(backend)?;
            }
        }

        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let now = to_db_time(OffsetDateTime::now_utc())?;

        let row = SessionEntity::find_by_id(session_id.to_string())
            .filter(session::Column::ExpiryDate.gt(now))
            .one(&self.conn)
            .await
            .map_err(backend)?;

        row.map(|row| {
            rmp_serde::from_slice(&row.data)
                .map_err(|e| session_store::Error::Decode(e.to_string()))
        })
        .transpose()
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        SessionEntity::delete_by_id(session_id.to_string())
            .exec(&self.conn)
            .await
            .map_err(backend)?;

        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for SeaOrmSessionStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let now = to_db_time(OffsetDateTime::now_utc())?;

        let result = SessionEntity::delete_many()
            .filter(session::Column::ExpiryDate.lt(now))
            .exec(&self.conn)
            .await
            .map_err(backend)?;
        debug!(rows = result.rows_affected, "deleted expired sessions");

        Ok(())
    }
}

/// `time` instants as stored by SeaORM (chrono, fixed UTC offset).
fn to_db_time(time: OffsetDateTime) -> session_store::Result<DateTimeWithTimeZone> {
    chrono::DateTime::from_timestamp(time.unix_timestamp(), time.nanosecond())
        .map(|utc| utc.fixed_offset())
        .ok_or_else(|| session_store::Error::Encode(format!("timestamp out of range: {time}")))
}
