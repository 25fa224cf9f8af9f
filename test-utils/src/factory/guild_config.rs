//! Guild configuration factory for creating test guild rows.

use crate::factory::helpers::next_id;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test guild configuration rows with customizable fields.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::factory::guild_config::GuildConfigFactory;
///
/// let guild = GuildConfigFactory::new(&db)
///     .guild_id(42)
///     .prefix("$")
///     .enable_cc(true)
///     .build()
///     .await?;
/// ```
pub struct GuildConfigFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: i64,
    prefix: String,
    enable_cc: bool,
    log_channel: Option<i64>,
}

impl<'a> GuildConfigFactory<'a> {
    /// Creates a new GuildConfigFactory with default values.
    ///
    /// Defaults:
    /// - guild_id: auto-incremented
    /// - prefix: `"!"`
    /// - enable_cc: `false`
    /// - log_channel: `None`
    ///
    /// # Arguments
    /// - `db` - Database connection for inserting the entity
    ///
    /// # Returns
    /// - `GuildConfigFactory` - New factory instance with defaults
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self {
            db,
            guild_id: next_id() as i64,
            prefix: "!".to_string(),
            enable_cc: false,
            log_channel: None,
        }
    }

    /// Sets the guild ID.
    pub fn guild_id(mut self, guild_id: i64) -> Self {
        self.guild_id = guild_id;
        self
    }

    /// Sets the command prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets whether custom commands are enabled.
    pub fn enable_cc(mut self, enable_cc: bool) -> Self {
        self.enable_cc = enable_cc;
        self
    }

    /// Sets the log channel.
    pub fn log_channel(mut self, log_channel: Option<i64>) -> Self {
        self.log_channel = log_channel;
        self
    }

    /// Builds and inserts the guild configuration row into the database.
    ///
    /// # Returns
    /// - `Ok(entity::guild_config::Model)` - Created guild configuration
    /// - `Err(DbErr)` - Database error during insert
    pub async fn build(self) -> Result<entity::guild_config::Model, DbErr> {
        entity::guild_config::ActiveModel {
            guild_id: ActiveValue::Set(self.guild_id),
            prefix: ActiveValue::Set(self.prefix),
            enable_cc: ActiveValue::Set(self.enable_cc),
            log_channel: ActiveValue::Set(self.log_channel),
            welcome_channel: ActiveValue::Set(None),
            system_channel: ActiveValue::Set(None),
        }
        .insert(self.db)
        .await
    }
}

/// Creates a guild configuration row with default values.
///
/// Shorthand for `GuildConfigFactory::new(db).build().await`.
pub async fn create_guild_config(
    db: &DatabaseConnection,
) -> Result<entity::guild_config::Model, DbErr> {
    GuildConfigFactory::new(db).build().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TestBuilder;
    use entity::prelude::*;

    #[tokio::test]
    async fn creates_guild_config_with_defaults() -> Result<(), DbErr> {
        let test = TestBuilder::new()
            .with_table(GuildConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let guild = create_guild_config(db).await?;

        assert_eq!(guild.prefix, "!");
        assert!(!guild.enable_cc);
        assert!(guild.log_channel.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn creates_multiple_unique_guilds() -> Result<(), DbErr> {
        let test = TestBuilder::new()
            .with_table(GuildConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let first = create_guild_config(db).await?;
        let second = create_guild_config(db).await?;

        assert_ne!(first.guild_id, second.guild_id);

        Ok(())
    }
}
