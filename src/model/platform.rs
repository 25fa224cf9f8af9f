//! Platform-facing models.
//!
//! Plain snapshots of users, members, roles, emojis, messages and audit-log entries as the
//! bot needs them. The serenity gateway converts its own types into these so command
//! modules and listeners never depend on the client library directly.

use chrono::{DateTime, Utc};
use serenity::all::Permissions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub id: u64,
    pub name: String,
    pub bot: bool,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
}

impl UserInfo {
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// A user in the context of one guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub user: UserInfo,
    pub guild_id: u64,
    pub nick: Option<String>,
    pub roles: Vec<u64>,
    /// Position of the member's highest role, 0 when only @everyone applies.
    pub top_role_position: u16,
    /// Guild-level permissions, already resolved through roles and ownership.
    pub permissions: Permissions,
    pub is_owner: bool,
    pub joined_at: Option<DateTime<Utc>>,
    pub premium_since: Option<DateTime<Utc>>,
}

impl MemberInfo {
    pub fn id(&self) -> u64 {
        self.user.id
    }

    pub fn mention(&self) -> String {
        self.user.mention()
    }

    pub fn display_name(&self) -> &str {
        self.nick.as_deref().unwrap_or(&self.user.name)
    }

    pub fn has_permissions(&self, required: Permissions) -> bool {
        self.is_owner || self.permissions.administrator() || self.permissions.contains(required)
    }

    /// Permissions from `required` this member lacks.
    pub fn missing_permissions(&self, required: Permissions) -> Permissions {
        if self.has_permissions(required) {
            Permissions::empty()
        } else {
            required.difference(self.permissions)
        }
    }

    /// Whether this member's top role sits strictly above the other member's.
    ///
    /// The guild owner outranks everyone and is outranked by nobody.
    pub fn outranks(&self, other: &MemberInfo) -> bool {
        if other.is_owner {
            return false;
        }
        self.is_owner || self.top_role_position > other.top_role_position
    }
}

/// Result of resolving a user reference that may or may not be a guild member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Member(MemberInfo),
    User(UserInfo),
}

impl Target {
    pub fn user(&self) -> &UserInfo {
        match self {
            Target::Member(member) => &member.user,
            Target::User(user) => user,
        }
    }

    pub fn member(&self) -> Option<&MemberInfo> {
        match self {
            Target::Member(member) => Some(member),
            Target::User(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInfo {
    pub id: u64,
    pub name: String,
    pub position: u16,
    pub managed: bool,
    /// The implicit @everyone role shares the guild's id.
    pub is_everyone: bool,
    pub permissions: Permissions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiInfo {
    pub id: u64,
    pub name: String,
    pub animated: bool,
    /// Roles allowed to use the emoji; empty means everyone.
    pub roles: Vec<u64>,
}

impl EmojiInfo {
    pub fn mention(&self) -> String {
        if self.animated {
            format!("<a:{}:{}>", self.name, self.id)
        } else {
            format!("<:{}:{}>", self.name, self.id)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub id: u64,
    pub channel_id: u64,
    pub guild_id: Option<u64>,
    pub author: UserInfo,
    pub content: String,
    pub pinned: bool,
    pub attachments: Vec<String>,
    pub embeds: usize,
    pub created_at: DateTime<Utc>,
}

impl ChannelMessage {
    pub fn jump_url(&self) -> String {
        let guild = self
            .guild_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "@me".to_string());
        format!(
            "https://discord.com/channels/{}/{}/{}",
            guild, self.channel_id, self.id
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Kick,
    Ban,
    Unban,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub id: u64,
    pub action: AuditAction,
    pub target_id: Option<u64>,
    pub moderator_id: Option<u64>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Who owns the bot application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owners {
    Single(u64),
    Team(Vec<u64>),
}

impl Owners {
    pub fn contains(&self, user_id: u64) -> bool {
        match self {
            Owners::Single(id) => *id == user_id,
            Owners::Team(ids) => ids.contains(&user_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub owners: Owners,
}
