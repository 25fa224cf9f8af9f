use sea_orm_migration::{prelude::*, schema::*};

use super::m20260101_000001_create_guild_config_table::GuildConfig;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserData::Table)
                    .if_not_exists()
                    .col(big_integer(UserData::GuildId))
                    .col(big_integer(UserData::UserId))
                    .col(integer(UserData::CurrentWarns).default(0))
                    .col(integer(UserData::TotalWarns).default(0))
                    .col(integer(UserData::TotalKicks).default(0))
                    .col(integer(UserData::TotalBans).default(0))
                    .primary_key(
                        Index::create()
                            .name("pk_user_data")
                            .col(UserData::GuildId)
                            .col(UserData::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_data_guild_id")
                            .from(UserData::Table, UserData::GuildId)
                            .to(GuildConfig::Table, GuildConfig::GuildId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserData::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum UserData {
    Table,
    GuildId,
    UserId,
    CurrentWarns,
    TotalWarns,
    TotalKicks,
    TotalBans,
}
