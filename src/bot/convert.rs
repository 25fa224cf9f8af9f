//! Conversions from serenity models to the bot's platform models.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serenity::all::{
    Emoji, GuildId, Member, Message, MessageUpdateEvent, Permissions, Role, RoleId, Timestamp,
    User, UserId,
};

use crate::model::platform::{ChannelMessage, EmojiInfo, MemberInfo, RoleInfo, UserInfo};

pub fn datetime(timestamp: &Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp.unix_timestamp(), 0).unwrap_or_default()
}

pub fn user_info(user: &User) -> UserInfo {
    UserInfo {
        id: user.id.get(),
        name: user.name.clone(),
        bot: user.bot,
        avatar_url: user.face(),
        created_at: datetime(&user.id.created_at()),
    }
}

pub fn channel_message(message: &Message) -> ChannelMessage {
    ChannelMessage {
        id: message.id.get(),
        channel_id: message.channel_id.get(),
        guild_id: message.guild_id.map(|id| id.get()),
        author: user_info(&message.author),
        content: message.content.clone(),
        pinned: message.pinned,
        attachments: message.attachments.iter().map(|a| a.url.clone()).collect(),
        embeds: message.embeds.len(),
        created_at: datetime(&message.timestamp),
    }
}

/// Rebuilds the edited message from a partial update, layered over the last known version.
pub fn message_from_update(
    event: &MessageUpdateEvent,
    previous: Option<&ChannelMessage>,
) -> Option<ChannelMessage> {
    let mut message = match (previous, &event.author) {
        (Some(previous), _) => previous.clone(),
        (None, Some(author)) => ChannelMessage {
            id: event.id.get(),
            channel_id: event.channel_id.get(),
            guild_id: event.guild_id.map(|id| id.get()),
            author: user_info(author),
            content: String::new(),
            pinned: false,
            attachments: Vec::new(),
            embeds: 0,
            created_at: event
                .timestamp
                .as_ref()
                .map(datetime)
                .unwrap_or_else(Utc::now),
        },
        (None, None) => return None,
    };

    if let Some(content) = &event.content {
        message.content = content.clone();
    }
    if let Some(pinned) = event.pinned {
        message.pinned = pinned;
    }
    if let Some(attachments) = &event.attachments {
        message.attachments = attachments.iter().map(|a| a.url.clone()).collect();
    }
    if let Some(embeds) = &event.embeds {
        message.embeds = embeds.len();
    }

    Some(message)
}

pub fn role_info(guild_id: GuildId, role: &Role) -> RoleInfo {
    RoleInfo {
        id: role.id.get(),
        name: role.name.clone(),
        position: role.position,
        managed: role.managed,
        is_everyone: role.id.get() == guild_id.get(),
        permissions: role.permissions,
    }
}

pub fn emoji_info(emoji: &Emoji) -> EmojiInfo {
    EmojiInfo {
        id: emoji.id.get(),
        name: emoji.name.clone(),
        animated: emoji.animated,
        roles: emoji.roles.iter().map(|id| id.get()).collect(),
    }
}

/// Resolves a member against the guild's owner and role table.
///
/// Guild-level permissions are the union of @everyone and the member's roles; the owner and
/// administrators hold every permission.
pub fn member_info(
    member: &Member,
    owner_id: UserId,
    roles: &HashMap<RoleId, Role>,
) -> MemberInfo {
    let guild_id = member.guild_id;
    let everyone = RoleId::new(guild_id.get());
    let is_owner = member.user.id == owner_id;

    let mut permissions = roles
        .get(&everyone)
        .map(|role| role.permissions)
        .unwrap_or_else(Permissions::empty);
    let mut top_role_position = 0;

    for role in member.roles.iter().filter_map(|id| roles.get(id)) {
        permissions |= role.permissions;
        top_role_position = top_role_position.max(role.position);
    }

    if is_owner || permissions.administrator() {
        permissions = Permissions::all();
    }

    MemberInfo {
        user: user_info(&member.user),
        guild_id: guild_id.get(),
        nick: member.nick.clone(),
        roles: member.roles.iter().map(|id| id.get()).collect(),
        top_role_position,
        permissions,
        is_owner,
        joined_at: member.joined_at.as_ref().map(datetime),
        premium_since: member.premium_since.as_ref().map(datetime),
    }
}
