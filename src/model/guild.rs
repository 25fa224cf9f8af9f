//! Domain model for per-guild configuration

/// Snapshot of a guild configuration row, as held by the in-memory cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildSettings {
    pub guild_id: u64,
    pub prefix: String,
    pub enable_cc: bool,
    pub log_channel: Option<u64>,
    pub welcome_channel: Option<u64>,
    pub system_channel: Option<u64>,
}

impl GuildSettings {
    /// Converts an entity model to the guild settings domain model
    ///
    /// # Arguments
    /// - `entity` - The entity model from the database
    ///
    /// # Returns
    /// - `GuildSettings` - The converted domain model
    pub fn from_entity(entity: entity::guild_config::Model) -> Self {
        Self {
            guild_id: entity.guild_id as u64,
            prefix: entity.prefix,
            enable_cc: entity.enable_cc,
            log_channel: entity.log_channel.map(|id| id as u64),
            welcome_channel: entity.welcome_channel.map(|id| id as u64),
            system_channel: entity.system_channel.map(|id| id as u64),
        }
    }
}
