//! Connection events: handshake, resume and shard stage changes.
//!
//! Every completed handshake or resume rebuilds the per-guild cache before commands are
//! processed again. A failed rebuild is retried a few times; while it keeps failing the
//! ready gate stays closed and messages wait.

use std::time::Duration;

use serenity::all::{ConnectionStage, Context, Ready, ResumedEvent, ShardStageUpdateEvent};

use crate::bot::Bot;

const CONNECT_ATTEMPTS: u32 = 3;
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Handles the ready event when a shard connects to Discord.
///
/// # Arguments
/// - `bot` - Lifecycle manager reconciling and caching the shard's guilds
/// - `ctx` - Discord context; only its shard id is used, the platform holds its own handles
/// - `ready` - Ready event data containing the bot user and its guilds
pub async fn handle_ready(bot: &Bot, ctx: Context, ready: Ready) {
    tracing::info!(
        "{} is connected to Discord with {} guild(s)",
        ready.user.name,
        ready.guilds.len()
    );

    let guild_ids: Vec<u64> = ready.guilds.iter().map(|guild| guild.id.get()).collect();
    connect(bot, ctx.shard_id.0, ready.user.id.get(), &guild_ids).await;
}

/// Handles a resumed session; the guild list comes from the serenity cache.
pub async fn handle_resume(bot: &Bot, ctx: Context, _event: ResumedEvent) {
    tracing::info!("Resumed gateway session");

    let guild_ids: Vec<u64> = ctx.cache.guilds().iter().map(|id| id.get()).collect();
    let user_id = ctx.cache.current_user().id.get();

    connect(bot, ctx.shard_id.0, user_id, &guild_ids).await;
}

pub async fn handle_shard_stage_update(bot: &Bot, _ctx: Context, event: ShardStageUpdateEvent) {
    tracing::debug!(
        "Shard {} stage {:?} -> {:?}",
        event.shard_id,
        event.old,
        event.new
    );

    match event.new {
        ConnectionStage::Disconnected => bot.on_connection_lost(event.shard_id.0),
        ConnectionStage::Connecting
        | ConnectionStage::Handshake
        | ConnectionStage::Identifying
        | ConnectionStage::Resuming => bot.on_connecting(),
        _ => {}
    }
}

async fn connect(bot: &Bot, shard_id: u32, user_id: u64, guild_ids: &[u64]) {
    for attempt in 1..=CONNECT_ATTEMPTS {
        match bot.on_connected(shard_id, user_id, guild_ids).await {
            Ok(()) => {
                bot.apply_activity().await;
                return;
            }
            Err(e) => {
                tracing::error!(
                    "Failed to prepare guild cache of shard {} (attempt {}/{}): {:?}",
                    shard_id,
                    attempt,
                    CONNECT_ATTEMPTS,
                    e
                );
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
        }
    }

    tracing::error!("Giving up on guild cache; commands stay paused until the next reconnect");
}
