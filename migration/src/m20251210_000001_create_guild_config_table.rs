use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GuildConfig::Table)
                    .if_not_exists()
                    .col(string(GuildConfig::GuildId).primary_key())
                    .col(string(GuildConfig::Prefix))
                    .col(json_null(GuildConfig::Autoresponder))
                    .col(timestamp(GuildConfig::CreatedAt))
                    .col(timestamp(GuildConfig::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GuildConfig::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GuildConfig {
    Table,
    GuildId,
    Prefix,
    Autoresponder,
    CreatedAt,
    UpdatedAt,
}
