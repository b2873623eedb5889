pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_session_table;
mod m20240101_000002_create_submission_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    // Keep clear of any migration table the host database already has
    fn migration_table_name() -> sea_orm::DynIden {
        Alias::new("song_submissions_migrations").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_session_table::Migration),
            Box::new(m20240101_000002_create_submission_table::Migration),
        ]
    }
}
