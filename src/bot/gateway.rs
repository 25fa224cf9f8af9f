//! `Platform` implementation over serenity's HTTP client, cache and shard manager.

use std::{
    collections::HashMap,
    sync::{Arc, OnceLock},
    time::Duration,
};

use async_trait::async_trait;
use serenity::{
    all::{
        ActivityData, Cache, ChannelId, Client, CreateEmbed, CreateEmbedFooter, CreateMessage,
        EmojiId, GetMessages, GuildId, Http, MessageId, Role, RoleId, ShardManager, Timestamp,
        UserId,
    },
    http::UserPagination,
    model::guild::audit_log::{Action, MemberAction},
};

use crate::{
    bot::{convert, platform::Platform},
    error::platform::PlatformError,
    model::{
        platform::{
            AppInfo, AuditAction, AuditEntry, ChannelMessage, EmojiInfo, MemberInfo, Owners,
            RoleInfo, UserInfo,
        },
        reply::{Embed, Reply},
    },
};

/// Discord's page size for message history and bulk deletion.
const MESSAGE_PAGE_SIZE: usize = 100;

#[derive(Default)]
pub struct SerenityPlatform {
    http: OnceLock<Arc<Http>>,
    cache: OnceLock<Arc<Cache>>,
    shard_manager: OnceLock<Arc<ShardManager>>,
}

impl SerenityPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the platform to a built client. Later calls are ignored.
    pub fn attach(&self, client: &Client) {
        let _ = self.http.set(client.http.clone());
        let _ = self.cache.set(client.cache.clone());
        let _ = self.shard_manager.set(client.shard_manager.clone());
    }

    fn http(&self) -> Result<&Http, PlatformError> {
        self.http
            .get()
            .map(Arc::as_ref)
            .ok_or(PlatformError::ConnectionClosed)
    }

    /// Cache-aware handle; serenity answers lookups from the cache before falling back to REST.
    fn cache_http(&self) -> Result<(&Arc<Cache>, &Http), PlatformError> {
        let cache = self.cache.get().ok_or(PlatformError::ConnectionClosed)?;
        Ok((cache, self.http()?))
    }

    /// Owner and role table of a guild, from the cache when available.
    async fn guild_snapshot(
        &self,
        guild_id: GuildId,
    ) -> Result<(UserId, HashMap<RoleId, Role>), PlatformError> {
        let cached = self
            .cache
            .get()
            .and_then(|cache| cache.guild(guild_id).map(|g| (g.owner_id, g.roles.clone())));

        if let Some(snapshot) = cached {
            return Ok(snapshot);
        }

        let guild = guild_id.to_partial_guild(self.http()?).await?;
        Ok((guild.owner_id, guild.roles))
    }
}

fn build_embed(embed: Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::new();
    if let Some(title) = embed.title {
        builder = builder.title(title);
    }
    if let Some(description) = embed.description {
        builder = builder.description(description);
    }
    if let Some(color) = embed.color {
        builder = builder.color(color);
    }
    for field in embed.fields {
        builder = builder.field(field.name, field.value, field.inline);
    }
    if let Some(footer) = embed.footer {
        builder = builder.footer(CreateEmbedFooter::new(footer));
    }
    if let Some(timestamp) = embed.timestamp {
        if let Ok(timestamp) = Timestamp::from_unix_timestamp(timestamp.timestamp()) {
            builder = builder.timestamp(timestamp);
        }
    }
    if let Some(url) = embed.thumbnail {
        builder = builder.thumbnail(url);
    }
    if let Some(url) = embed.image {
        builder = builder.image(url);
    }
    builder
}

fn not_found_as_none<T>(result: Result<T, serenity::Error>) -> Result<Option<T>, PlatformError> {
    match result.map_err(PlatformError::from) {
        Ok(value) => Ok(Some(value)),
        Err(PlatformError::NotFound) => Ok(None),
        Err(err) => Err(err),
    }
}

fn audit_action(action: AuditAction) -> Action {
    match action {
        AuditAction::Kick => Action::Member(MemberAction::Kick),
        AuditAction::Ban => Action::Member(MemberAction::BanAdd),
        AuditAction::Unban => Action::Member(MemberAction::BanRemove),
    }
}

#[async_trait]
impl Platform for SerenityPlatform {
    async fn guild_name(&self, guild_id: u64) -> Option<String> {
        let guild_id = GuildId::new(guild_id);
        let cached = self
            .cache
            .get()
            .and_then(|cache| cache.guild(guild_id).map(|g| g.name.clone()));
        if cached.is_some() {
            return cached;
        }

        let http = self.http().ok()?;
        guild_id.to_partial_guild(http).await.ok().map(|g| g.name)
    }

    async fn send(&self, channel_id: u64, reply: Reply) -> Result<u64, PlatformError> {
        let channel = ChannelId::new(channel_id);
        let mut builder = CreateMessage::new();

        if let Some(content) = reply.content {
            builder = builder.content(content);
        }
        if let Some(embed) = reply.embed {
            builder = builder.embed(build_embed(embed));
        }
        if let Some(reference) = reply.reference {
            builder = builder.reference_message((channel, MessageId::new(reference)));
        }

        let message = channel.send_message(self.http()?, builder).await?;
        Ok(message.id.get())
    }

    async fn direct_message(&self, user_id: u64, content: &str) -> Result<(), PlatformError> {
        UserId::new(user_id)
            .direct_message(self.http()?, CreateMessage::new().content(content))
            .await?;
        Ok(())
    }

    async fn member(&self, guild_id: u64, user_id: u64) -> Result<Option<MemberInfo>, PlatformError> {
        let guild = GuildId::new(guild_id);

        let member = guild.member(self.cache_http()?, UserId::new(user_id)).await;
        let Some(member) = not_found_as_none(member)? else {
            return Ok(None);
        };
        let (owner_id, roles) = self.guild_snapshot(guild).await?;

        Ok(Some(convert::member_info(&member, owner_id, &roles)))
    }

    async fn find_member(&self, guild_id: u64, name: &str) -> Result<Option<MemberInfo>, PlatformError> {
        let guild = GuildId::new(guild_id);

        let candidates = guild.search_members(self.http()?, name, Some(25)).await?;
        let found = candidates.into_iter().find(|member| {
            member.user.name.eq_ignore_ascii_case(name)
                || member
                    .nick
                    .as_deref()
                    .is_some_and(|nick| nick.eq_ignore_ascii_case(name))
        });

        let Some(member) = found else {
            return Ok(None);
        };
        let (owner_id, roles) = self.guild_snapshot(guild).await?;

        Ok(Some(convert::member_info(&member, owner_id, &roles)))
    }

    async fn user(&self, user_id: u64) -> Result<Option<UserInfo>, PlatformError> {
        let user = not_found_as_none(UserId::new(user_id).to_user(self.http()?).await)?;
        Ok(user.as_ref().map(convert::user_info))
    }

    async fn kick(&self, guild_id: u64, user_id: u64, reason: Option<&str>) -> Result<(), PlatformError> {
        let (guild, user) = (GuildId::new(guild_id), UserId::new(user_id));
        let http = self.http()?;

        match reason {
            Some(reason) => guild.kick_with_reason(http, user, reason).await?,
            None => guild.kick(http, user).await?,
        }
        Ok(())
    }

    async fn ban(&self, guild_id: u64, user_id: u64, reason: Option<&str>) -> Result<(), PlatformError> {
        let (guild, user) = (GuildId::new(guild_id), UserId::new(user_id));
        let http = self.http()?;

        match reason {
            Some(reason) => guild.ban_with_reason(http, user, 0, reason).await?,
            None => guild.ban(http, user, 0).await?,
        }
        Ok(())
    }

    async fn unban(&self, guild_id: u64, user_id: u64, reason: Option<&str>) -> Result<(), PlatformError> {
        self.http()?
            .remove_ban(GuildId::new(guild_id), UserId::new(user_id), reason)
            .await?;
        Ok(())
    }

    async fn is_banned(&self, guild_id: u64, user_id: u64) -> Result<bool, PlatformError> {
        // Bans are paginated by user id, so the page right after `user_id - 1` starts with
        // `user_id` when that user is banned.
        let after = (user_id > 1).then(|| UserPagination::After(UserId::new(user_id - 1)));

        let bans = self
            .http()?
            .get_bans(GuildId::new(guild_id), after, Some(1))
            .await?;

        Ok(bans.iter().any(|ban| ban.user.id.get() == user_id))
    }

    async fn recent_messages(&self, channel_id: u64, limit: usize) -> Result<Vec<ChannelMessage>, PlatformError> {
        let channel = ChannelId::new(channel_id);
        let http = self.http()?;
        let mut collected: Vec<ChannelMessage> = Vec::new();

        while collected.len() < limit {
            let page_size = (limit - collected.len()).min(MESSAGE_PAGE_SIZE);
            let mut request = GetMessages::new().limit(page_size as u8);
            if let Some(oldest) = collected.last() {
                request = request.before(MessageId::new(oldest.id));
            }

            let page = channel.messages(http, request).await?;
            let exhausted = page.len() < page_size;
            collected.extend(page.iter().map(convert::channel_message));

            if exhausted {
                break;
            }
        }

        Ok(collected)
    }

    async fn delete_messages(&self, channel_id: u64, message_ids: &[u64]) -> Result<(), PlatformError> {
        let channel = ChannelId::new(channel_id);
        let http = self.http()?;

        for chunk in message_ids.chunks(MESSAGE_PAGE_SIZE) {
            match chunk {
                [single] => channel.delete_message(http, MessageId::new(*single)).await?,
                ids => {
                    let ids: Vec<MessageId> = ids.iter().map(|id| MessageId::new(*id)).collect();
                    channel.delete_messages(http, &ids).await?
                }
            }
        }

        Ok(())
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), PlatformError> {
        ChannelId::new(channel_id)
            .delete_message(self.http()?, MessageId::new(message_id))
            .await?;
        Ok(())
    }

    async fn message_exists(&self, channel_id: u64, message_id: u64) -> Result<bool, PlatformError> {
        let message = ChannelId::new(channel_id)
            .message(self.http()?, MessageId::new(message_id))
            .await;
        Ok(not_found_as_none(message)?.is_some())
    }

    async fn audit_log(&self, guild_id: u64, action: AuditAction, limit: u8) -> Result<Vec<AuditEntry>, PlatformError> {
        let logs = GuildId::new(guild_id)
            .audit_logs(self.http()?, Some(audit_action(action)), None, None, Some(limit))
            .await?;

        Ok(logs
            .entries
            .into_iter()
            .map(|entry| AuditEntry {
                id: entry.id.get(),
                action,
                target_id: entry.target_id.map(|id| id.get()),
                moderator_id: Some(entry.user_id.get()),
                reason: entry.reason,
                created_at: convert::datetime(&entry.id.created_at()),
            })
            .collect())
    }

    async fn roles(&self, guild_id: u64) -> Result<Vec<RoleInfo>, PlatformError> {
        let guild = GuildId::new(guild_id);
        let (_, roles) = self.guild_snapshot(guild).await?;

        let mut roles: Vec<RoleInfo> = roles
            .values()
            .map(|role| convert::role_info(guild, role))
            .collect();
        roles.sort_by(|a, b| b.position.cmp(&a.position));

        Ok(roles)
    }

    async fn add_role(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<(), PlatformError> {
        self.http()?
            .add_member_role(
                GuildId::new(guild_id),
                UserId::new(user_id),
                RoleId::new(role_id),
                None,
            )
            .await?;
        Ok(())
    }

    async fn remove_role(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<(), PlatformError> {
        self.http()?
            .remove_member_role(
                GuildId::new(guild_id),
                UserId::new(user_id),
                RoleId::new(role_id),
                None,
            )
            .await?;
        Ok(())
    }

    async fn emojis(&self, guild_id: u64) -> Result<Vec<EmojiInfo>, PlatformError> {
        let emojis = GuildId::new(guild_id).emojis(self.http()?).await?;
        Ok(emojis.iter().map(convert::emoji_info).collect())
    }

    async fn set_emoji_roles(&self, guild_id: u64, emoji_id: u64, role_ids: &[u64]) -> Result<(), PlatformError> {
        let body = serde_json::json!({ "roles": role_ids.iter().map(u64::to_string).collect::<Vec<_>>() });

        self.http()?
            .edit_emoji(GuildId::new(guild_id), EmojiId::new(emoji_id), &body, None)
            .await?;
        Ok(())
    }

    async fn latency(&self) -> Option<Duration> {
        let shard_manager = self.shard_manager.get()?;
        let runners = shard_manager.runners.lock().await;

        runners.values().find_map(|runner| runner.latency)
    }

    async fn application_info(&self) -> Result<AppInfo, PlatformError> {
        let info = self.http()?.get_current_application_info().await?;

        let owners = match (&info.team, &info.owner) {
            (Some(team), _) => Owners::Team(team.members.iter().map(|m| m.user.id.get()).collect()),
            (None, Some(owner)) => Owners::Single(owner.id.get()),
            (None, None) => Owners::Team(Vec::new()),
        };

        Ok(AppInfo {
            id: info.id.get(),
            name: info.name,
            description: info.description,
            owners,
        })
    }

    async fn set_activity(&self, text: Option<&str>) {
        let Some(shard_manager) = self.shard_manager.get() else {
            return;
        };
        let activity = text.map(ActivityData::playing);

        let runners = shard_manager.runners.lock().await;
        for runner in runners.values() {
            runner.runner_tx.set_activity(activity.clone());
        }
    }

    async fn shutdown(&self) {
        if let Some(shard_manager) = self.shard_manager.get() {
            shard_manager.shutdown_all().await;
        }
    }
}
