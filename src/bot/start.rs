use std::sync::Arc;

use serenity::all::{Client, GatewayIntents};

use crate::{
    bot::{gateway::SerenityPlatform, handler::Handler, Bot},
    error::AppError,
};

/// Connects the bot to Discord and runs until every shard has shut down.
///
/// # Gateway Intents
/// `GUILD_MEMBERS` and `MESSAGE_CONTENT` are privileged intents and must be enabled in the
/// Discord Developer Portal for the bot application.
///
/// # Arguments
/// - `bot` - Lifecycle manager receiving the gateway events
/// - `platform` - Platform implementation the bot was built with; bound to the new client
///
/// # Returns
/// - `Ok(())` - The client stopped, usually after a shutdown or restart command
/// - `Err(AppError)` - Client construction or the gateway connection failed
pub async fn start_bot(bot: Arc<Bot>, platform: Arc<SerenityPlatform>) -> Result<(), AppError> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MODERATION
        | GatewayIntents::GUILD_EMOJIS_AND_STICKERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let (token, shard_count) = {
        let config = bot.config().await;
        let settings = config.settings();
        (settings.token.clone(), settings.shard_count)
    };

    let mut client = Client::builder(&token, intents)
        .event_handler(Handler::new(bot.clone()))
        .await?;

    platform.attach(&client);
    bot.start()?;

    tracing::info!("Starting Discord bot with {} shard(s)...", shard_count);

    client.start_shards(shard_count).await?;

    Ok(())
}
