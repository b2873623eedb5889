use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MusicSubmissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MusicSubmissions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MusicSubmissions::Name).text().not_null())
                    .col(ColumnDef::new(MusicSubmissions::SongName).text().not_null())
                    .col(ColumnDef::new(MusicSubmissions::SpotifyLink).text().not_null())
                    .col(ColumnDef::new(MusicSubmissions::SessionId).string().null())
                    .col(
                        ColumnDef::new(MusicSubmissions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One submission per session; NULL session ids are not constrained
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_music_submissions_session_id")
                    .table(MusicSubmissions::Table)
                    .col(MusicSubmissions::SessionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_music_submissions_created_at")
                    .table(MusicSubmissions::Table)
                    .col(MusicSubmissions::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MusicSubmissions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MusicSubmissions {
    Table,
    Id,
    Name,
    SongName,
    SpotifyLink,
    SessionId,
    CreatedAt,
}
