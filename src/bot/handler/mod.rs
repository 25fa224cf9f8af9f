use std::sync::Arc;

use serenity::all::{
    ChannelId, Context, EventHandler, Guild, GuildId, Member, Message, MessageId,
    MessageUpdateEvent, Ready, ResumedEvent, ShardStageUpdateEvent, User,
};
use serenity::async_trait;

use crate::bot::Bot;

pub mod guild;
pub mod member;
pub mod message;
pub mod ready;

/// Discord bot event handler
///
/// Forwards gateway events to the lifecycle manager.
pub struct Handler {
    pub bot: Arc<Bot>,
}

impl Handler {
    pub fn new(bot: Arc<Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when a shard completes the gateway handshake
    async fn ready(&self, ctx: Context, ready: Ready) {
        ready::handle_ready(&self.bot, ctx, ready).await;
    }

    /// Called when a shard resumes a dropped session
    async fn resume(&self, ctx: Context, event: ResumedEvent) {
        ready::handle_resume(&self.bot, ctx, event).await;
    }

    /// Called whenever a shard changes its connection stage
    async fn shard_stage_update(&self, ctx: Context, event: ShardStageUpdateEvent) {
        ready::handle_shard_stage_update(&self.bot, ctx, event).await;
    }

    /// Called when a guild becomes available or the bot joins a new guild
    async fn guild_create(&self, ctx: Context, guild: Guild, is_new: Option<bool>) {
        guild::handle_guild_create(&self.bot, ctx, guild, is_new).await;
    }

    /// Called when a member joins a guild
    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        member::handle_guild_member_addition(&self.bot, ctx, new_member).await;
    }

    /// Called when a member leaves or is removed from a guild
    async fn guild_member_removal(
        &self,
        ctx: Context,
        guild_id: GuildId,
        user: User,
        member_data_if_available: Option<Member>,
    ) {
        member::handle_guild_member_removal(&self.bot, ctx, guild_id, user, member_data_if_available)
            .await;
    }

    /// Called when a user is banned from a guild
    async fn guild_ban_addition(&self, ctx: Context, guild_id: GuildId, banned_user: User) {
        member::handle_guild_ban_addition(&self.bot, ctx, guild_id, banned_user).await;
    }

    /// Called when a user is unbanned from a guild
    async fn guild_ban_removal(&self, ctx: Context, guild_id: GuildId, unbanned_user: User) {
        member::handle_guild_ban_removal(&self.bot, ctx, guild_id, unbanned_user).await;
    }

    /// Called when a message is created in a guild or private channel
    async fn message(&self, ctx: Context, new_message: Message) {
        message::handle_message(&self.bot, ctx, new_message).await;
    }

    /// Called when a message is edited
    async fn message_update(
        &self,
        ctx: Context,
        old_if_available: Option<Message>,
        new: Option<Message>,
        event: MessageUpdateEvent,
    ) {
        message::handle_message_update(&self.bot, ctx, old_if_available, new, event).await;
    }

    /// Called when a message is deleted
    async fn message_delete(
        &self,
        ctx: Context,
        channel_id: ChannelId,
        deleted_message_id: MessageId,
        guild_id: Option<GuildId>,
    ) {
        message::handle_message_delete(&self.bot, ctx, channel_id, deleted_message_id, guild_id)
            .await;
    }
}
