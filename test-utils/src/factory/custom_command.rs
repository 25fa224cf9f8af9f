//! Custom command factory.

use crate::factory::helpers::next_id;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating custom command rows. The referenced guild row must already exist.
pub struct CustomCommandFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: i64,
    command: String,
    response: String,
}

impl<'a> CustomCommandFactory<'a> {
    /// Defaults:
    /// - command: `"cmd{id}"`
    /// - response: `"Response {id}"`
    pub fn new(db: &'a DatabaseConnection, guild_id: i64) -> Self {
        let id = next_id();
        Self {
            db,
            guild_id,
            command: format!("cmd{}", id),
            response: format!("Response {}", id),
        }
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn response(mut self, response: impl Into<String>) -> Self {
        self.response = response.into();
        self
    }

    pub async fn build(self) -> Result<entity::custom_command::Model, DbErr> {
        entity::custom_command::ActiveModel {
            guild_id: ActiveValue::Set(self.guild_id),
            command: ActiveValue::Set(self.command),
            response: ActiveValue::Set(self.response),
        }
        .insert(self.db)
        .await
    }
}

/// Creates a custom command with generated name and response.
pub async fn create_custom_command(
    db: &DatabaseConnection,
    guild_id: i64,
) -> Result<entity::custom_command::Model, DbErr> {
    CustomCommandFactory::new(db, guild_id).build().await
}
