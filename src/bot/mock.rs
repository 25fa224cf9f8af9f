//! Recording `Platform` double for tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serenity::all::Permissions;
use tokio::sync::Notify;

use crate::{
    bot::platform::Platform,
    error::platform::PlatformError,
    model::{
        platform::{
            AppInfo, AuditAction, AuditEntry, ChannelMessage, EmojiInfo, MemberInfo, Owners,
            RoleInfo, UserInfo,
        },
        reply::Reply,
    },
};

pub fn user(id: u64, name: &str) -> UserInfo {
    UserInfo {
        id,
        name: name.to_string(),
        bot: false,
        avatar_url: format!("https://cdn.discordapp.com/embed/avatars/{}.png", id % 5),
        created_at: Utc::now(),
    }
}

pub fn member(user: UserInfo, guild_id: u64, top_role_position: u16, permissions: Permissions) -> MemberInfo {
    MemberInfo {
        user,
        guild_id,
        nick: None,
        roles: Vec::new(),
        top_role_position,
        permissions,
        is_owner: false,
        joined_at: Some(Utc::now()),
        premium_since: None,
    }
}

pub fn message(
    id: u64,
    channel_id: u64,
    guild_id: Option<u64>,
    author: &UserInfo,
    content: &str,
) -> ChannelMessage {
    ChannelMessage {
        id,
        channel_id,
        guild_id,
        author: author.clone(),
        content: content.to_string(),
        pinned: false,
        attachments: Vec::new(),
        embeds: 0,
        created_at: Utc::now(),
    }
}

pub fn role(id: u64, name: &str, position: u16) -> RoleInfo {
    RoleInfo {
        id,
        name: name.to_string(),
        position,
        managed: false,
        is_everyone: false,
        permissions: Permissions::empty(),
    }
}

#[derive(Default)]
pub struct MockState {
    pub guild_names: HashMap<u64, String>,
    pub members: HashMap<(u64, u64), MemberInfo>,
    pub users: HashMap<u64, UserInfo>,
    pub bans: HashSet<(u64, u64)>,
    /// Channel history, oldest first.
    pub messages: HashMap<u64, Vec<ChannelMessage>>,
    pub roles: HashMap<u64, Vec<RoleInfo>>,
    pub emojis: HashMap<u64, Vec<EmojiInfo>>,
    pub audit: Vec<(u64, AuditEntry)>,
    pub owners: Vec<u64>,
    pub dm_forbidden: HashSet<u64>,

    pub sent: Vec<(u64, Reply)>,
    pub direct_messages: Vec<(u64, String)>,
    pub kicked: Vec<(u64, u64, Option<String>)>,
    pub banned: Vec<(u64, u64, Option<String>)>,
    pub unbanned: Vec<(u64, u64)>,
    pub deleted: Vec<u64>,
    pub bulk_deletes: Vec<Vec<u64>>,
    pub activity: Option<String>,
    pub shutdown: bool,
    pub application_info_calls: usize,
    /// Makes the next `application_info` call wait until notified; later calls run freely.
    pub hold_application_info: Option<Arc<Notify>>,
    next_message_id: u64,
}

#[derive(Default)]
pub struct MockPlatform {
    state: Mutex<MockState>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn add_member(&self, member: MemberInfo) {
        let mut state = self.state();
        state.users.insert(member.id(), member.user.clone());
        state.members.insert((member.guild_id, member.id()), member);
    }

    pub fn add_user(&self, user: UserInfo) {
        self.state().users.insert(user.id, user);
    }

    pub fn add_message(&self, message: ChannelMessage) {
        self.state()
            .messages
            .entry(message.channel_id)
            .or_default()
            .push(message);
    }

    pub fn add_audit_entry(&self, guild_id: u64, entry: AuditEntry) {
        self.state().audit.push((guild_id, entry));
    }

    /// Text of every message sent to channels, in order.
    pub fn sent_texts(&self) -> Vec<String> {
        self.state()
            .sent
            .iter()
            .filter_map(|(_, reply)| reply.content.clone())
            .collect()
    }

    pub fn last_text(&self) -> Option<String> {
        self.sent_texts().pop()
    }

    pub fn last_reply(&self) -> Option<Reply> {
        self.state().sent.last().map(|(_, reply)| reply.clone())
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn guild_name(&self, guild_id: u64) -> Option<String> {
        self.state().guild_names.get(&guild_id).cloned()
    }

    async fn send(&self, channel_id: u64, reply: Reply) -> Result<u64, PlatformError> {
        let mut state = self.state();
        state.next_message_id += 1;
        let id = 900_000 + state.next_message_id;
        state.sent.push((channel_id, reply));
        Ok(id)
    }

    async fn direct_message(&self, user_id: u64, content: &str) -> Result<(), PlatformError> {
        let mut state = self.state();
        if state.dm_forbidden.contains(&user_id) {
            return Err(PlatformError::Forbidden);
        }
        state.direct_messages.push((user_id, content.to_string()));
        Ok(())
    }

    async fn member(&self, guild_id: u64, user_id: u64) -> Result<Option<MemberInfo>, PlatformError> {
        Ok(self.state().members.get(&(guild_id, user_id)).cloned())
    }

    async fn find_member(&self, guild_id: u64, name: &str) -> Result<Option<MemberInfo>, PlatformError> {
        Ok(self
            .state()
            .members
            .values()
            .find(|m| m.guild_id == guild_id && m.user.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn user(&self, user_id: u64) -> Result<Option<UserInfo>, PlatformError> {
        Ok(self.state().users.get(&user_id).cloned())
    }

    async fn kick(&self, guild_id: u64, user_id: u64, reason: Option<&str>) -> Result<(), PlatformError> {
        let mut state = self.state();
        state.members.remove(&(guild_id, user_id));
        state.kicked.push((guild_id, user_id, reason.map(str::to_string)));
        Ok(())
    }

    async fn ban(&self, guild_id: u64, user_id: u64, reason: Option<&str>) -> Result<(), PlatformError> {
        let mut state = self.state();
        state.members.remove(&(guild_id, user_id));
        state.bans.insert((guild_id, user_id));
        state.banned.push((guild_id, user_id, reason.map(str::to_string)));
        Ok(())
    }

    async fn unban(&self, guild_id: u64, user_id: u64, _reason: Option<&str>) -> Result<(), PlatformError> {
        let mut state = self.state();
        state.bans.remove(&(guild_id, user_id));
        state.unbanned.push((guild_id, user_id));
        Ok(())
    }

    async fn is_banned(&self, guild_id: u64, user_id: u64) -> Result<bool, PlatformError> {
        Ok(self.state().bans.contains(&(guild_id, user_id)))
    }

    async fn recent_messages(&self, channel_id: u64, limit: usize) -> Result<Vec<ChannelMessage>, PlatformError> {
        Ok(self
            .state()
            .messages
            .get(&channel_id)
            .map(|messages| messages.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_messages(&self, channel_id: u64, message_ids: &[u64]) -> Result<(), PlatformError> {
        let mut state = self.state();
        let cutoff = Utc::now() - ChronoDuration::days(14);
        let too_old = state.messages.get(&channel_id).is_some_and(|messages| {
            messages
                .iter()
                .any(|m| message_ids.contains(&m.id) && m.created_at < cutoff)
        });
        if too_old {
            return Err(PlatformError::Other(
                "You can only bulk delete messages that are under 14 days old.".to_string(),
            ));
        }

        if let Some(messages) = state.messages.get_mut(&channel_id) {
            messages.retain(|message| !message_ids.contains(&message.id));
        }
        state.bulk_deletes.push(message_ids.to_vec());
        state.deleted.extend_from_slice(message_ids);
        Ok(())
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), PlatformError> {
        let mut state = self.state();
        let messages = state
            .messages
            .get_mut(&channel_id)
            .ok_or(PlatformError::NotFound)?;
        let before = messages.len();
        messages.retain(|message| message.id != message_id);
        if messages.len() == before {
            return Err(PlatformError::NotFound);
        }
        state.deleted.push(message_id);
        Ok(())
    }

    async fn message_exists(&self, channel_id: u64, message_id: u64) -> Result<bool, PlatformError> {
        Ok(self
            .state()
            .messages
            .get(&channel_id)
            .is_some_and(|messages| messages.iter().any(|m| m.id == message_id)))
    }

    async fn audit_log(&self, guild_id: u64, action: AuditAction, limit: u8) -> Result<Vec<AuditEntry>, PlatformError> {
        Ok(self
            .state()
            .audit
            .iter()
            .rev()
            .filter(|(guild, entry)| *guild == guild_id && entry.action == action)
            .take(limit as usize)
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    async fn roles(&self, guild_id: u64) -> Result<Vec<RoleInfo>, PlatformError> {
        Ok(self.state().roles.get(&guild_id).cloned().unwrap_or_default())
    }

    async fn add_role(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<(), PlatformError> {
        let mut state = self.state();
        let member = state
            .members
            .get_mut(&(guild_id, user_id))
            .ok_or(PlatformError::NotFound)?;
        if !member.roles.contains(&role_id) {
            member.roles.push(role_id);
        }
        Ok(())
    }

    async fn remove_role(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<(), PlatformError> {
        let mut state = self.state();
        let member = state
            .members
            .get_mut(&(guild_id, user_id))
            .ok_or(PlatformError::NotFound)?;
        member.roles.retain(|id| *id != role_id);
        Ok(())
    }

    async fn emojis(&self, guild_id: u64) -> Result<Vec<EmojiInfo>, PlatformError> {
        Ok(self.state().emojis.get(&guild_id).cloned().unwrap_or_default())
    }

    async fn set_emoji_roles(&self, guild_id: u64, emoji_id: u64, role_ids: &[u64]) -> Result<(), PlatformError> {
        let mut state = self.state();
        let emoji = state
            .emojis
            .get_mut(&guild_id)
            .and_then(|emojis| emojis.iter_mut().find(|e| e.id == emoji_id))
            .ok_or(PlatformError::NotFound)?;
        emoji.roles = role_ids.to_vec();
        Ok(())
    }

    async fn latency(&self) -> Option<Duration> {
        Some(Duration::from_millis(42))
    }

    async fn application_info(&self) -> Result<AppInfo, PlatformError> {
        let hold = self.state().hold_application_info.take();
        if let Some(release) = hold {
            release.notified().await;
        }

        let mut state = self.state();
        state.application_info_calls += 1;

        Ok(AppInfo {
            id: 1,
            name: "modbot".to_string(),
            description: "A moderation bot".to_string(),
            owners: Owners::Team(state.owners.clone()),
        })
    }

    async fn set_activity(&self, text: Option<&str>) {
        self.state().activity = text.map(str::to_string);
    }

    async fn shutdown(&self) {
        self.state().shutdown = true;
    }
}
