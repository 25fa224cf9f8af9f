//! Boundary to the chat platform.
//!
//! Every outbound action the bot takes goes through `Platform`, so command modules and the
//! lifecycle manager can run against the serenity gateway in production and a recording
//! double in tests.

use std::time::Duration;

use async_trait::async_trait;

use crate::{
    error::platform::PlatformError,
    model::{
        platform::{
            AppInfo, AuditAction, AuditEntry, ChannelMessage, EmojiInfo, MemberInfo, RoleInfo,
            UserInfo,
        },
        reply::Reply,
    },
};

#[async_trait]
pub trait Platform: Send + Sync {
    async fn guild_name(&self, guild_id: u64) -> Option<String>;

    /// Sends a reply to a channel and returns the new message's id.
    async fn send(&self, channel_id: u64, reply: Reply) -> Result<u64, PlatformError>;

    async fn direct_message(&self, user_id: u64, content: &str) -> Result<(), PlatformError>;

    /// `Ok(None)` when the user is not a member of the guild.
    async fn member(&self, guild_id: u64, user_id: u64) -> Result<Option<MemberInfo>, PlatformError>;

    /// Looks a member up by user name or nickname.
    async fn find_member(&self, guild_id: u64, name: &str) -> Result<Option<MemberInfo>, PlatformError>;

    async fn user(&self, user_id: u64) -> Result<Option<UserInfo>, PlatformError>;

    async fn kick(&self, guild_id: u64, user_id: u64, reason: Option<&str>) -> Result<(), PlatformError>;

    /// Bans without deleting any of the user's messages.
    async fn ban(&self, guild_id: u64, user_id: u64, reason: Option<&str>) -> Result<(), PlatformError>;

    async fn unban(&self, guild_id: u64, user_id: u64, reason: Option<&str>) -> Result<(), PlatformError>;

    async fn is_banned(&self, guild_id: u64, user_id: u64) -> Result<bool, PlatformError>;

    /// Up to `limit` most recent messages of a channel, newest first.
    async fn recent_messages(&self, channel_id: u64, limit: usize) -> Result<Vec<ChannelMessage>, PlatformError>;

    /// Bulk deletion; every message must be younger than two weeks.
    async fn delete_messages(&self, channel_id: u64, message_ids: &[u64]) -> Result<(), PlatformError>;

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), PlatformError>;

    async fn message_exists(&self, channel_id: u64, message_id: u64) -> Result<bool, PlatformError>;

    /// Most recent audit-log entries of one action type, newest first.
    async fn audit_log(&self, guild_id: u64, action: AuditAction, limit: u8) -> Result<Vec<AuditEntry>, PlatformError>;

    async fn roles(&self, guild_id: u64) -> Result<Vec<RoleInfo>, PlatformError>;

    async fn add_role(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<(), PlatformError>;

    async fn remove_role(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<(), PlatformError>;

    async fn emojis(&self, guild_id: u64) -> Result<Vec<EmojiInfo>, PlatformError>;

    /// Restricts an emoji to `role_ids`; an empty slice makes it available to everyone.
    async fn set_emoji_roles(&self, guild_id: u64, emoji_id: u64, role_ids: &[u64]) -> Result<(), PlatformError>;

    /// Gateway heartbeat latency, `None` before the first heartbeat.
    async fn latency(&self) -> Option<Duration>;

    async fn application_info(&self) -> Result<AppInfo, PlatformError>;

    async fn set_activity(&self, text: Option<&str>);

    /// Closes every gateway connection.
    async fn shutdown(&self);
}
