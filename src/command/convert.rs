//! Converters from raw arguments to platform objects.
//!
//! Mentions, raw ids and names are accepted, in that order. Failures map to the matching
//! "not found" command error carrying the raw argument.

use serenity::utils::{parse_channel_mention, parse_emoji, parse_role_mention, parse_user_mention};

use crate::{
    command::{Args, CommandContext},
    error::command::CommandError,
    model::platform::{EmojiInfo, MemberInfo, RoleInfo, Target, UserInfo},
};

fn parse_user_id(arg: &str) -> Option<u64> {
    parse_user_mention(arg)
        .map(|id| id.get())
        .or_else(|| arg.parse().ok())
}

pub async fn member(ctx: &CommandContext<'_>, arg: &str) -> Result<MemberInfo, CommandError> {
    let guild = ctx.guild()?;
    let platform = &ctx.bot.platform;

    let found = match parse_user_id(arg) {
        Some(id) => platform.member(guild.id, id).await?,
        None => platform.find_member(guild.id, arg).await?,
    };

    found.ok_or_else(|| CommandError::MemberNotFound(arg.to_string()))
}

pub async fn user(ctx: &CommandContext<'_>, arg: &str) -> Result<UserInfo, CommandError> {
    let found = match parse_user_id(arg) {
        Some(id) => ctx.bot.platform.user(id).await?,
        None => None,
    };

    found.ok_or_else(|| CommandError::UserNotFound(arg.to_string()))
}

/// A guild member when possible, otherwise any user the platform knows.
pub async fn member_or_user(ctx: &CommandContext<'_>, arg: &str) -> Result<Target, CommandError> {
    match member(ctx, arg).await {
        Ok(member) => return Ok(Target::Member(member)),
        Err(CommandError::MemberNotFound(_)) => {}
        Err(err) => return Err(err),
    }

    match user(ctx, arg).await {
        Ok(user) => Ok(Target::User(user)),
        Err(CommandError::UserNotFound(_)) => Err(CommandError::MemberOrUserNotFound(arg.to_string())),
        Err(err) => Err(err),
    }
}

fn match_role<'r>(roles: &'r [RoleInfo], arg: &str) -> Option<&'r RoleInfo> {
    let id = parse_role_mention(arg)
        .map(|id| id.get())
        .or_else(|| arg.parse().ok());

    if let Some(id) = id {
        return roles.iter().find(|role| role.id == id);
    }

    roles
        .iter()
        .find(|role| role.name == arg)
        .or_else(|| roles.iter().find(|role| role.name.eq_ignore_ascii_case(arg)))
}

pub async fn role(ctx: &CommandContext<'_>, arg: &str) -> Result<RoleInfo, CommandError> {
    let guild = ctx.guild()?;
    let roles = ctx.bot.platform.roles(guild.id).await?;

    match_role(&roles, arg)
        .cloned()
        .ok_or_else(|| CommandError::RoleNotFound(arg.to_string()))
}

/// Consumes as many role arguments as convert, stopping at the first one that does not.
///
/// The @everyone role is rejected.
pub async fn roles_greedy(ctx: &CommandContext<'_>, args: &mut Args) -> Result<Vec<RoleInfo>, CommandError> {
    let guild = ctx.guild()?;
    let roles = ctx.bot.platform.roles(guild.id).await?;
    let mut converted = Vec::new();

    while let Some(arg) = args.peek() {
        let Some(role) = match_role(&roles, &arg) else {
            break;
        };
        if role.is_everyone {
            return Err(CommandError::BadRole(role.name.clone()));
        }

        converted.push(role.clone());
        args.next();
    }

    Ok(converted)
}

/// Emoji of the invoking guild, by markup, id or name.
pub async fn local_emoji(ctx: &CommandContext<'_>, arg: &str) -> Result<EmojiInfo, CommandError> {
    let guild = ctx.guild()?;
    let emojis = ctx.bot.platform.emojis(guild.id).await?;

    let id = parse_emoji(arg)
        .map(|emoji| emoji.id.get())
        .or_else(|| arg.parse().ok());

    let found = match id {
        Some(id) => emojis.into_iter().find(|emoji| emoji.id == id),
        None => emojis.into_iter().find(|emoji| emoji.name == arg),
    };

    found.ok_or_else(|| CommandError::EmojiNotFound(arg.to_string()))
}

pub fn channel_id(arg: &str) -> Result<u64, CommandError> {
    parse_channel_mention(arg)
        .map(|id| id.get())
        .or_else(|| arg.parse().ok())
        .ok_or_else(|| CommandError::BadArgument(format!("Channel \"{arg}\" not found.")))
}

pub fn int(arg: &str, parameter: &str) -> Result<i64, CommandError> {
    arg.parse().map_err(|_| {
        CommandError::BadArgument(format!(
            "Converting to \"int\" failed for parameter \"{parameter}\"."
        ))
    })
}
