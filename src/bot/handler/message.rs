use serenity::all::{ChannelId, Context, GuildId, Message, MessageId, MessageUpdateEvent};

use crate::bot::{convert, Bot};

/// Handle message creation in a guild or private channel
pub async fn handle_message(bot: &Bot, _ctx: Context, message: Message) {
    bot.handle_message(convert::channel_message(&message)).await;
}

/// Handle an edited message
///
/// The full new message is used when serenity has it; otherwise the partial update is
/// layered over the bot's own copy of the message.
pub async fn handle_message_update(
    bot: &Bot,
    _ctx: Context,
    _old_if_available: Option<Message>,
    new: Option<Message>,
    event: MessageUpdateEvent,
) {
    let after = match new {
        Some(message) => Some(convert::channel_message(&message)),
        None => {
            let previous = bot.recent.get(event.id.get());
            convert::message_from_update(&event, previous.as_ref())
        }
    };

    let Some(after) = after else {
        tracing::debug!("Skipping edit of unknown message {}", event.id);
        return;
    };

    bot.on_message_edit(after).await;
}

/// Handle a deleted message
pub async fn handle_message_delete(
    bot: &Bot,
    _ctx: Context,
    _channel_id: ChannelId,
    deleted_message_id: MessageId,
    _guild_id: Option<GuildId>,
) {
    bot.on_message_delete(deleted_message_id.get()).await;
}
