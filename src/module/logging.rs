//! Log channel reporting.
//!
//! Listener-only module. Every event of a guild with a configured log channel is rendered as
//! an embed and posted there. Guilds without a log channel are skipped silently.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    bot::Bot,
    model::{
        event::{BotEvent, Dispatched, ModerationEntry},
        platform::{ChannelMessage, UserInfo},
        reply::{Embed, Reply},
    },
    module::{Listener, Module, Registry},
    util::{
        embed::{fit, ZERO_WIDTH},
        format,
    },
};

pub struct LoggingModule;

impl Module for LoggingModule {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn install(&self, registry: &mut Registry) {
        registry.add_listener(self.name(), Arc::new(LogListener));
    }
}

fn base_embed(title: &str) -> Embed {
    Embed::new()
        .title(format!("Log: {title}"))
        .footer(format::datetime(&Utc::now()))
}

fn message_embed(title: &str, message: &ChannelMessage) -> Embed {
    base_embed(title)
        .thumbnail(message.author.avatar_url.clone())
        .field("User:", message.author.mention(), false)
        .field("User ID:", message.author.id.to_string(), false)
        .field("Channel:", format!("<#{}>", message.channel_id), false)
        .field(
            "Message ID:",
            format!(
                "[{}]({} 'Click to jump to the message')",
                message.id,
                message.jump_url()
            ),
            false,
        )
}

/// Adds a single image as the embed image, or several as a list of links.
fn attachments_field(embed: Embed, files: &[&String], single: &str, multiple: &str) -> Embed {
    match files {
        [] => embed,
        [file] => embed.field(single, ZERO_WIDTH, false).image(file.as_str()),
        files => embed.field(
            multiple,
            files
                .iter()
                .map(|file| file.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            false,
        ),
    }
}

/// `None` when neither the text nor the attachments changed.
fn edit_embed(before: &ChannelMessage, after: &ChannelMessage) -> Option<Embed> {
    let content_changed = before.content != after.content;
    let attachments_changed = before.attachments != after.attachments;
    if !content_changed && !attachments_changed {
        return None;
    }

    let mut embed = message_embed("Message Edited", before);

    if content_changed {
        // A message may have had an attachment and no text.
        if !before.content.is_empty() {
            embed = embed.field("Old content:", before.content.clone(), false);
        }
        let new_content = if after.content.is_empty() {
            ZERO_WIDTH.to_string()
        } else {
            after.content.clone()
        };
        embed = embed.field("New content:", new_content, false);
    }

    if attachments_changed {
        let removed: Vec<&String> = before
            .attachments
            .iter()
            .filter(|url| !after.attachments.contains(url))
            .collect();
        let added: Vec<&String> = after
            .attachments
            .iter()
            .filter(|url| !before.attachments.contains(url))
            .collect();

        embed = attachments_field(embed, &removed, "Removed image:", "Removed multiple images:");
        embed = attachments_field(embed, &added, "Added image:", "Added multiple images:");
    }

    Some(fit(embed))
}

/// `None` for messages without text and attachments.
fn delete_embed(message: &ChannelMessage) -> Option<Embed> {
    if message.content.is_empty() && message.attachments.is_empty() {
        return None;
    }

    let mut embed = message_embed("Message Deleted", message);
    if !message.content.is_empty() {
        embed = embed.field("Content:", message.content.clone(), false);
    }

    let files: Vec<&String> = message.attachments.iter().collect();
    embed = attachments_field(embed, &files, "Attachment:", "Attachments:");

    Some(fit(embed))
}

fn membership_embed(title: &str, user: &UserInfo) -> Embed {
    base_embed(title)
        .thumbnail(user.avatar_url.clone())
        .field("User:", user.mention(), false)
        .field("User ID:", user.id.to_string(), false)
}

fn moderation_embed(title: &str, user: &UserInfo, entry: Option<&ModerationEntry>) -> Embed {
    let moderator = entry
        .and_then(|entry| entry.moderator_id)
        .map_or_else(|| "Unknown".to_string(), |id| format!("<@{id}>"));
    let reason = entry
        .and_then(|entry| entry.reason.clone())
        .filter(|reason| !reason.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    fit(base_embed(title)
        .thumbnail(user.avatar_url.clone())
        .field("User:", user.mention(), false)
        .field("By:", moderator, false)
        .field("With Reason:", reason, false))
}

/// Renders the log embed of an event, `None` when there is nothing to report.
fn render(event: &BotEvent) -> Option<Embed> {
    match event {
        BotEvent::MemberJoin { user, .. } => Some(membership_embed("User Has Joined", user)),
        BotEvent::MemberLeft { user, .. } => Some(membership_embed("User Has Left", user)),
        BotEvent::MemberWarn { user, entry, .. } => {
            Some(moderation_embed("User Has Been Warned", user, Some(entry)))
        }
        BotEvent::MemberUnwarn { user, entry, .. } => {
            Some(moderation_embed("User Has Been Unwarned", user, Some(entry)))
        }
        BotEvent::MemberKick { user, entry, .. } => {
            Some(moderation_embed("User Has Been Kicked", user, Some(entry)))
        }
        BotEvent::MemberBan { user, entry, .. } => {
            Some(moderation_embed("User Has Been Banned", user, entry.as_ref()))
        }
        BotEvent::MemberUnban { user, entry, .. } => {
            Some(moderation_embed("User Has Been Unbanned", user, entry.as_ref()))
        }
        BotEvent::MessageEdit { before, after } if !before.author.bot => edit_embed(before, after),
        BotEvent::MessageDelete { message } if !message.author.bot => delete_embed(message),
        BotEvent::MessageEdit { .. } | BotEvent::MessageDelete { .. } => None,
    }
}

struct LogListener;

#[async_trait]
impl Listener for LogListener {
    async fn on_event(&self, bot: &Bot, dispatched: &Dispatched) {
        // Only guild events are logged.
        let Some(guild_id) = dispatched.event.guild_id() else {
            return;
        };
        let Some(channel_id) = bot.cache.log_channel(guild_id) else {
            return;
        };
        let Some(embed) = render(&dispatched.event) else {
            return;
        };

        if let Err(e) = bot.platform.send(channel_id, Reply::embed(embed)).await {
            tracing::error!(
                "Failed to post log entry to channel {} of guild {}: {:?}",
                channel_id,
                guild_id,
                e
            );
        }
    }
}
