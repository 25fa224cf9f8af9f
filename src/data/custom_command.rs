use migration::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, DbErr, DeleteResult, EntityTrait, QueryFilter,
};

use crate::model::custom_command::CustomCommand;

pub struct CustomCommandRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CustomCommandRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads every custom command of the given guilds.
    pub async fn get_many(&self, guild_ids: &[u64]) -> Result<Vec<CustomCommand>, DbErr> {
        let mut commands = Vec::new();

        for page in guild_ids.chunks(crate::data::guild_config::RECONCILE_PAGE_SIZE) {
            let models = entity::prelude::CustomCommand::find()
                .filter(
                    entity::custom_command::Column::GuildId
                        .is_in(page.iter().map(|id| *id as i64)),
                )
                .all(self.db)
                .await?;

            commands.extend(models.into_iter().map(CustomCommand::from_entity));
        }

        Ok(commands)
    }

    pub async fn find(&self, guild_id: u64, command: &str) -> Result<Option<CustomCommand>, DbErr> {
        let model = entity::prelude::CustomCommand::find_by_id((guild_id as i64, command.to_string()))
            .one(self.db)
            .await?;

        Ok(model.map(CustomCommand::from_entity))
    }

    /// Creates a custom command or replaces the response of an existing one
    pub async fn upsert(
        &self,
        guild_id: u64,
        command: &str,
        response: &str,
    ) -> Result<CustomCommand, DbErr> {
        let model = entity::prelude::CustomCommand::insert(entity::custom_command::ActiveModel {
            guild_id: ActiveValue::Set(guild_id as i64),
            command: ActiveValue::Set(command.to_string()),
            response: ActiveValue::Set(response.to_string()),
        })
        .on_conflict(
            OnConflict::columns([
                entity::custom_command::Column::GuildId,
                entity::custom_command::Column::Command,
            ])
            .update_column(entity::custom_command::Column::Response)
            .to_owned(),
        )
        .exec_with_returning(self.db)
        .await?;

        Ok(CustomCommand::from_entity(model))
    }

    /// Deletes a custom command
    ///
    /// # Returns
    /// - `Ok(true)`: The command existed and was removed
    /// - `Ok(false)`: No such command
    pub async fn delete(&self, guild_id: u64, command: &str) -> Result<bool, DbErr> {
        let result: DeleteResult = entity::prelude::CustomCommand::delete_by_id((
            guild_id as i64,
            command.to_string(),
        ))
        .exec(self.db)
        .await?;

        Ok(result.rows_affected > 0)
    }
}
