use serenity::all::{Context, Guild};

use crate::bot::Bot;

/// Handles a guild becoming available.
///
/// Only guilds the bot has just joined need work here; guilds available at startup are
/// covered by the reconciliation that runs on ready.
///
/// # Arguments
/// - `bot` - Lifecycle manager owning the guild configuration cache
/// - `ctx` - Discord context
/// - `guild` - The guild that became available
/// - `is_new` - `Some(true)` when the bot was just added to the guild
pub async fn handle_guild_create(bot: &Bot, _ctx: Context, guild: Guild, is_new: Option<bool>) {
    tracing::debug!("Guild create event: {} ({})", guild.name, guild.id);

    if is_new != Some(true) {
        return;
    }

    if let Err(e) = bot.on_guild_join(guild.id.get()).await {
        tracing::error!("Failed to create configuration for guild {}: {:?}", guild.id, e);
    }
}
