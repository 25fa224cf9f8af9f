use std::collections::BTreeSet;

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::model::guild::GuildSettings;

/// Number of guild ids diffed against the table per query.
pub const RECONCILE_PAGE_SIZE: usize = 5000;

/// Rows per multi-row insert, kept well below SQLite's bound-parameter limit.
const INSERT_CHUNK_SIZE: usize = 500;

pub struct GuildConfigRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GuildConfigRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds the configuration row of a guild
    ///
    /// # Arguments
    /// - `guild_id`: Discord's unique identifier for the guild
    ///
    /// # Returns
    /// - `Ok(Some(GuildSettings))`: Row found
    /// - `Ok(None)`: The guild has no configuration row
    /// - `Err(DbErr)`: Database error during query
    pub async fn find(&self, guild_id: u64) -> Result<Option<GuildSettings>, DbErr> {
        let model = entity::prelude::GuildConfig::find_by_id(guild_id as i64)
            .one(self.db)
            .await?;

        Ok(model.map(GuildSettings::from_entity))
    }

    /// Creates a configuration row with the default prefix for a guild.
    ///
    /// New rows have custom commands disabled and no channels configured.
    ///
    /// # Arguments
    /// - `guild_id`: Discord's unique identifier for the guild
    /// - `prefix`: Process-wide default prefix
    ///
    /// # Returns
    /// - `Ok(GuildSettings)`: The created row
    /// - `Err(DbErr)`: Database error, including a duplicate primary key
    pub async fn create_default(&self, guild_id: u64, prefix: &str) -> Result<GuildSettings, DbErr> {
        let model = default_row(guild_id, prefix).insert(self.db).await?;

        Ok(GuildSettings::from_entity(model))
    }

    /// Determines which of the given guilds have no configuration row.
    ///
    /// Ids are diffed against the table in pages of `RECONCILE_PAGE_SIZE` so a bot in many
    /// guilds never issues one unbounded query.
    ///
    /// # Arguments
    /// - `guild_ids`: Ids of every guild the bot is currently a member of
    ///
    /// # Returns
    /// - `Ok(Vec<u64>)`: Ids without a row, ascending
    /// - `Err(DbErr)`: Database error during query
    pub async fn missing_guild_ids(&self, guild_ids: &[u64]) -> Result<Vec<u64>, DbErr> {
        let mut missing: BTreeSet<u64> = guild_ids.iter().copied().collect();
        let wanted: Vec<u64> = missing.iter().copied().collect();

        for page in wanted.chunks(RECONCILE_PAGE_SIZE) {
            let existing: Vec<i64> = entity::prelude::GuildConfig::find()
                .select_only()
                .column(entity::guild_config::Column::GuildId)
                .filter(
                    entity::guild_config::Column::GuildId
                        .is_in(page.iter().map(|id| *id as i64)),
                )
                .order_by_asc(entity::guild_config::Column::GuildId)
                .into_tuple()
                .all(self.db)
                .await?;

            for id in existing {
                missing.remove(&(id as u64));
            }
        }

        Ok(missing.into_iter().collect())
    }

    /// Inserts default rows for all given guilds.
    ///
    /// # Arguments
    /// - `guild_ids`: Guilds known to have no row yet
    /// - `prefix`: Process-wide default prefix
    ///
    /// # Returns
    /// - `Ok(())`: All rows inserted (or nothing to insert)
    /// - `Err(DbErr)`: Database error during insert
    pub async fn insert_defaults(&self, guild_ids: &[u64], prefix: &str) -> Result<(), DbErr> {
        for chunk in guild_ids.chunks(INSERT_CHUNK_SIZE) {
            entity::prelude::GuildConfig::insert_many(
                chunk.iter().map(|id| default_row(*id, prefix)),
            )
            .exec(self.db)
            .await?;
        }

        Ok(())
    }

    /// Loads the rows of the given guilds.
    pub async fn get_many(&self, guild_ids: &[u64]) -> Result<Vec<GuildSettings>, DbErr> {
        let mut settings = Vec::with_capacity(guild_ids.len());

        for page in guild_ids.chunks(RECONCILE_PAGE_SIZE) {
            let models = entity::prelude::GuildConfig::find()
                .filter(
                    entity::guild_config::Column::GuildId
                        .is_in(page.iter().map(|id| *id as i64)),
                )
                .all(self.db)
                .await?;

            settings.extend(models.into_iter().map(GuildSettings::from_entity));
        }

        Ok(settings)
    }

    /// Updates the command prefix of a guild
    ///
    /// # Arguments
    /// - `guild_id`: Discord's unique identifier for the guild
    /// - `prefix`: Already validated prefix
    ///
    /// # Returns
    /// - `Ok(GuildSettings)`: The updated row
    /// - `Err(DbErr::RecordNotFound)`: The guild has no row
    /// - `Err(DbErr)`: Other database error
    pub async fn set_prefix(&self, guild_id: u64, prefix: &str) -> Result<GuildSettings, DbErr> {
        let model = entity::guild_config::ActiveModel {
            guild_id: ActiveValue::Unchanged(guild_id as i64),
            prefix: ActiveValue::Set(prefix.to_string()),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        Ok(GuildSettings::from_entity(model))
    }

    /// Sets or clears the channel moderation events are logged to
    pub async fn set_log_channel(
        &self,
        guild_id: u64,
        channel_id: Option<u64>,
    ) -> Result<GuildSettings, DbErr> {
        let model = entity::guild_config::ActiveModel {
            guild_id: ActiveValue::Unchanged(guild_id as i64),
            log_channel: ActiveValue::Set(channel_id.map(|id| id as i64)),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        Ok(GuildSettings::from_entity(model))
    }
}

fn default_row(guild_id: u64, prefix: &str) -> entity::guild_config::ActiveModel {
    entity::guild_config::ActiveModel {
        guild_id: ActiveValue::Set(guild_id as i64),
        prefix: ActiveValue::Set(prefix.to_string()),
        enable_cc: ActiveValue::Set(false),
        log_channel: ActiveValue::Set(None),
        welcome_channel: ActiveValue::Set(None),
        system_channel: ActiveValue::Set(None),
    }
}
