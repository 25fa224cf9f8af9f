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
                    .table(CustomCommand::Table)
                    .if_not_exists()
                    .col(big_integer(CustomCommand::GuildId))
                    .col(string(CustomCommand::Command))
                    .col(text(CustomCommand::Response))
                    .primary_key(
                        Index::create()
                            .name("pk_custom_command")
                            .col(CustomCommand::GuildId)
                            .col(CustomCommand::Command),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_custom_command_guild_id")
                            .from(CustomCommand::Table, CustomCommand::GuildId)
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
            .drop_table(Table::drop().table(CustomCommand::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CustomCommand {
    Table,
    GuildId,
    Command,
    Response,
}
