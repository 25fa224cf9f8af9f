//! Moderation commands: warnings, kicks, bans and message purging.
//!
//! Warn and unwarn go through the bot's event pipeline so the counters are committed before
//! the reply is built. Kick and ban counters are left to the gateway events the platform
//! sends back after the action.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serenity::all::Permissions;

use crate::{
    command::{convert, Args, Command, CommandContext, GuildContext, Guard},
    error::{command::CommandError, platform::PlatformError},
    model::{
        event::{BotEvent, ModerationEntry},
        platform::{ChannelMessage, MemberInfo, Target, UserInfo},
        reply::Reply,
    },
    module::{Module, Registry},
    util::format::plural,
};

const ATTENTION_NO_DM: &str = " \n**Attention**: I could not message them.";

const PURGE_LIMIT: i64 = 100;
const PURGE_LIMIT_WITH_TARGET: i64 = 200;
/// Bulk deletion rejects the whole batch if one message is older than two weeks.
const BULK_DELETE_MAX_AGE_DAYS: i64 = 14;

pub struct AdminModule;

impl Module for AdminModule {
    fn name(&self) -> &'static str {
        "admin"
    }

    fn install(&self, registry: &mut Registry) {
        let name = self.name();
        registry.add_command(name, Arc::new(Warn));
        registry.add_command(name, Arc::new(Unwarn));
        registry.add_command(name, Arc::new(Kick));
        registry.add_command(name, Arc::new(Ban));
        registry.add_command(name, Arc::new(Unban));
        registry.add_command(name, Arc::new(Purge));
    }
}

/// Sends `text` to the user privately.
///
/// # Returns
/// - `Ok(true)` - Delivered, or skipped because the user is a bot
/// - `Ok(false)` - The user does not accept direct messages from the bot
async fn notify(ctx: &CommandContext<'_>, user: &UserInfo, text: &str) -> Result<bool, CommandError> {
    if user.bot {
        return Ok(true);
    }

    match ctx.bot.platform.direct_message(user.id, text).await {
        Ok(()) => Ok(true),
        Err(PlatformError::Forbidden) => {
            tracing::debug!("User {} does not accept direct messages", user.id);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Sends the DM, then replies with `response`, annotated when the DM failed.
async fn notify_and_reply(
    ctx: &CommandContext<'_>,
    user: &UserInfo,
    message: &str,
    mut response: String,
) -> Result<(), CommandError> {
    if !notify(ctx, user, message).await? {
        response.push_str(ATTENTION_NO_DM);
    }

    ctx.reply_text(response).await?;
    Ok(())
}

/// Both the invoker (unless acting on themselves) and the bot must outrank the target.
fn check_hierarchy(guild: &GuildContext, target: &MemberInfo) -> Result<(), CommandError> {
    if guild.author.id() != target.id() && !guild.author.outranks(target) {
        return Err(CommandError::TooLowInHierarchy);
    }
    if !guild.me.outranks(target) {
        return Err(CommandError::BotTooLowInHierarchy);
    }
    Ok(())
}

/// Reads the target argument and the optional trailing reason.
async fn target_and_reason(
    ctx: &CommandContext<'_>,
    args: &mut Args,
) -> Result<(Target, Option<String>), CommandError> {
    let arg = args.next().ok_or_else(|| ctx.missing_argument("member"))?;
    let target = convert::member_or_user(ctx, &arg).await?;

    Ok((target, args.rest()))
}

fn with_reason(reason: &Option<String>, plain: String, reasoned: impl FnOnce(&str) -> String) -> String {
    match reason {
        Some(reason) => reasoned(reason),
        None => plain,
    }
}

struct Warn;

#[async_trait]
impl Command for Warn {
    fn name(&self) -> &'static str {
        "warn"
    }

    fn usage(&self) -> &'static str {
        "warn <member> [reason]"
    }

    fn guards(&self) -> Vec<Guard> {
        vec![
            Guard::GuildOnly,
            Guard::UserPermissions(Permissions::KICK_MEMBERS),
        ]
    }

    async fn run(&self, ctx: &CommandContext<'_>, mut args: Args) -> Result<(), CommandError> {
        let guild = ctx.guild()?;
        let (target, reason) = target_and_reason(ctx, &mut args).await?;
        let user = target.user().clone();

        let dispatched = ctx
            .bot
            .emit(BotEvent::MemberWarn {
                guild_id: guild.id,
                user: user.clone(),
                entry: ModerationEntry::new(ctx.author_id(), reason.clone()),
            })
            .await?;
        let warnings = dispatched.record.map_or(0, |record| record.current_warns);

        let message = with_reason(
            &reason,
            format!("You were warned in **{}**. You have **{warnings}** warning(s) now.", guild.name),
            |reason| {
                format!(
                    "You were warned in **{}** with the reason: **{reason}**. You have **{warnings}** warning(s) now.",
                    guild.name
                )
            },
        );
        let response = with_reason(
            &reason,
            format!("Warned {}. They have **{warnings}** warning(s) now.", user.mention()),
            |reason| {
                format!(
                    "Warned {} with the reason: **{reason}**. They have **{warnings}** warning(s) now.",
                    user.mention()
                )
            },
        );

        notify_and_reply(ctx, &user, &message, response).await
    }
}

struct Unwarn;

#[async_trait]
impl Command for Unwarn {
    fn name(&self) -> &'static str {
        "unwarn"
    }

    fn usage(&self) -> &'static str {
        "unwarn <member> [reason]"
    }

    fn guards(&self) -> Vec<Guard> {
        vec![
            Guard::GuildOnly,
            Guard::UserPermissions(Permissions::KICK_MEMBERS),
        ]
    }

    async fn run(&self, ctx: &CommandContext<'_>, mut args: Args) -> Result<(), CommandError> {
        let guild = ctx.guild()?;
        let (target, reason) = target_and_reason(ctx, &mut args).await?;
        let user = target.user().clone();

        let dispatched = ctx
            .bot
            .emit(BotEvent::MemberUnwarn {
                guild_id: guild.id,
                user: user.clone(),
                entry: ModerationEntry::new(ctx.author_id(), reason.clone()),
            })
            .await?;

        if !dispatched.changed {
            ctx.reply_text(format!("{} has no warnings to remove.", user.mention()))
                .await?;
            return Ok(());
        }

        let warnings = dispatched.record.map_or(0, |record| record.current_warns);

        let message = with_reason(
            &reason,
            format!(
                "You were forgiven one warning in **{}**. You have **{warnings}** warning(s) now.",
                guild.name
            ),
            |reason| {
                format!(
                    "You were forgiven one warning in **{}** with the reason: **{reason}**. You have **{warnings}** warning(s) now.",
                    guild.name
                )
            },
        );
        let response = with_reason(
            &reason,
            format!(
                "Removed a warning from {}. They have **{warnings}** warning(s) now.",
                user.mention()
            ),
            |reason| {
                format!(
                    "Removed a warning from {} with the reason: **{reason}**. They have **{warnings}** warning(s) now.",
                    user.mention()
                )
            },
        );

        notify_and_reply(ctx, &user, &message, response).await
    }
}

struct Kick;

#[async_trait]
impl Command for Kick {
    fn name(&self) -> &'static str {
        "kick"
    }

    fn usage(&self) -> &'static str {
        "kick <member> [reason]"
    }

    fn guards(&self) -> Vec<Guard> {
        vec![
            Guard::GuildOnly,
            Guard::UserPermissions(Permissions::KICK_MEMBERS),
            Guard::BotPermissions(Permissions::KICK_MEMBERS),
        ]
    }

    async fn run(&self, ctx: &CommandContext<'_>, mut args: Args) -> Result<(), CommandError> {
        let guild = ctx.guild()?;
        let arg = args.next().ok_or_else(|| ctx.missing_argument("member"))?;
        let member = convert::member(ctx, &arg).await?;
        let reason = args.rest();

        check_hierarchy(guild, &member)?;

        let message = with_reason(
            &reason,
            format!("You were kicked from **{}**.", guild.name),
            |reason| format!("You were kicked from **{}** with the reason: **{reason}**.", guild.name),
        );
        let mut response = with_reason(
            &reason,
            format!("Kicked {}.", member.mention()),
            |reason| format!("Kicked {} with the reason: **{reason}**.", member.mention()),
        );

        // Direct messages only reach users that still share a guild with the bot.
        if !notify(ctx, &member.user, &message).await? {
            response.push_str(ATTENTION_NO_DM);
        }

        ctx.bot
            .platform
            .kick(guild.id, member.id(), reason.as_deref())
            .await?;
        tracing::info!("Kicked user {} from guild {}", member.id(), guild.id);

        ctx.reply_text(response).await?;
        Ok(())
    }
}

struct Ban;

#[async_trait]
impl Command for Ban {
    fn name(&self) -> &'static str {
        "ban"
    }

    fn usage(&self) -> &'static str {
        "ban <member> [reason]"
    }

    fn guards(&self) -> Vec<Guard> {
        vec![
            Guard::GuildOnly,
            Guard::UserPermissions(Permissions::BAN_MEMBERS),
            Guard::BotPermissions(Permissions::BAN_MEMBERS),
        ]
    }

    async fn run(&self, ctx: &CommandContext<'_>, mut args: Args) -> Result<(), CommandError> {
        let guild = ctx.guild()?;
        let (target, reason) = target_and_reason(ctx, &mut args).await?;

        // Non-members have no roles to compare.
        if let Some(member) = target.member() {
            check_hierarchy(guild, member)?;
        }
        let user = target.user();

        let message = with_reason(
            &reason,
            format!("You were banned from **{}**.", guild.name),
            |reason| format!("You were banned from **{}** with the reason: **{reason}**.", guild.name),
        );
        let mut response = with_reason(
            &reason,
            format!("Banned {}.", user.mention()),
            |reason| format!("Banned {} with the reason: **{reason}**.", user.mention()),
        );

        if !notify(ctx, user, &message).await? {
            response.push_str(ATTENTION_NO_DM);
        }

        ctx.bot
            .platform
            .ban(guild.id, user.id, reason.as_deref())
            .await?;
        tracing::info!("Banned user {} from guild {}", user.id, guild.id);

        ctx.reply_text(response).await?;
        Ok(())
    }
}

struct Unban;

#[async_trait]
impl Command for Unban {
    fn name(&self) -> &'static str {
        "unban"
    }

    fn usage(&self) -> &'static str {
        "unban <member> [reason]"
    }

    fn guards(&self) -> Vec<Guard> {
        vec![
            Guard::GuildOnly,
            Guard::UserPermissions(Permissions::BAN_MEMBERS),
            Guard::BotPermissions(Permissions::BAN_MEMBERS),
        ]
    }

    async fn run(&self, ctx: &CommandContext<'_>, mut args: Args) -> Result<(), CommandError> {
        let guild = ctx.guild()?;
        let (target, reason) = target_and_reason(ctx, &mut args).await?;
        let user = target.user();

        if !ctx.bot.platform.is_banned(guild.id, user.id).await? {
            ctx.reply_text(format!("{} has not been banned.", user.mention()))
                .await?;
            return Ok(());
        }

        ctx.bot
            .platform
            .unban(guild.id, user.id, reason.as_deref())
            .await?;
        tracing::info!("Unbanned user {} in guild {}", user.id, guild.id);

        let message = with_reason(
            &reason,
            format!("You were unbanned in **{}**.", guild.name),
            |reason| format!("You were unbanned in **{}** with the reason: **{reason}**.", guild.name),
        );
        let response = with_reason(
            &reason,
            format!("Unbanned {}.", user.mention()),
            |reason| format!("Unbanned {} with the reason: **{reason}**.", user.mention()),
        );

        notify_and_reply(ctx, user, &message, response).await
    }
}

struct Purge;

#[async_trait]
impl Command for Purge {
    fn name(&self) -> &'static str {
        "purge"
    }

    fn usage(&self) -> &'static str {
        "purge <limit> [member]"
    }

    fn guards(&self) -> Vec<Guard> {
        vec![
            Guard::GuildOnly,
            Guard::UserPermissions(Permissions::MANAGE_MESSAGES),
            Guard::BotPermissions(Permissions::MANAGE_MESSAGES),
        ]
    }

    async fn run(&self, ctx: &CommandContext<'_>, mut args: Args) -> Result<(), CommandError> {
        ctx.guild()?;
        let limit = args.next().ok_or_else(|| ctx.missing_argument("limit"))?;
        let limit = convert::int(&limit, "limit")?;

        let target = match args.rest() {
            Some(arg) => Some(convert::member_or_user(ctx, &arg).await?.user().id),
            None => None,
        };

        let max_limit = if target.is_some() {
            PURGE_LIMIT_WITH_TARGET
        } else {
            PURGE_LIMIT
        };
        let limit = limit.clamp(0, max_limit) as usize;

        let platform = &ctx.bot.platform;
        let channel_id = ctx.channel_id();

        // The scan window is `limit` messages regardless of how many match the target.
        let messages: Vec<ChannelMessage> = if limit == 0 {
            Vec::new()
        } else {
            platform
                .recent_messages(channel_id, limit)
                .await?
                .into_iter()
                .filter(|message| target.is_none_or(|id| message.author.id == id))
                .collect()
        };

        // A minute of slack keeps messages right at the boundary out of the bulk request.
        let cutoff = Utc::now() - ChronoDuration::days(BULK_DELETE_MAX_AGE_DAYS)
            + ChronoDuration::minutes(1);
        let (recent, old): (Vec<&ChannelMessage>, Vec<&ChannelMessage>) =
            messages.iter().partition(|message| message.created_at > cutoff);

        let recent_ids: Vec<u64> = recent.iter().map(|message| message.id).collect();
        if !recent_ids.is_empty() {
            platform.delete_messages(channel_id, &recent_ids).await?;
        }
        for message in old {
            platform.delete_message(channel_id, message.id).await?;
        }

        let deleted = messages.len();
        tracing::info!(
            "Purged {} message(s) in channel {} on behalf of {}",
            deleted,
            channel_id,
            ctx.author_id()
        );

        let response = Reply::text(format!("Deleted {} message{}.", deleted, plural(deleted)));
        if platform.message_exists(channel_id, ctx.message.id).await? {
            ctx.reply(response).await?;
        } else {
            ctx.send(response).await?;
        }

        Ok(())
    }
}
