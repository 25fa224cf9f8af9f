//! Checks composed in front of a command body.
//!
//! Guards always run in the same order regardless of how a command lists them: guild-only
//! first, then ownership, then the invoker's permissions, and the bot's own permissions last.

use serenity::all::Permissions;

use crate::{command::CommandContext, error::command::CommandError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    GuildOnly,
    Owner,
    /// Bot owner, or a guild administrator when invoked in a guild.
    OwnerOrAdmin,
    UserPermissions(Permissions),
    BotPermissions(Permissions),
}

impl Guard {
    fn rank(&self) -> u8 {
        match self {
            Guard::GuildOnly => 0,
            Guard::Owner | Guard::OwnerOrAdmin => 1,
            Guard::UserPermissions(_) => 2,
            Guard::BotPermissions(_) => 3,
        }
    }

    pub async fn check(&self, ctx: &CommandContext<'_>) -> Result<(), CommandError> {
        match self {
            Guard::GuildOnly => ctx.guild().map(|_| ()),
            Guard::Owner => {
                if ctx.bot.is_owner(ctx.author_id()).await {
                    Ok(())
                } else {
                    Err(CommandError::NotOwner)
                }
            }
            Guard::OwnerOrAdmin => {
                let admin = ctx
                    .guild
                    .as_ref()
                    .is_some_and(|guild| guild.author.has_permissions(Permissions::ADMINISTRATOR));

                if admin || ctx.bot.is_owner(ctx.author_id()).await {
                    Ok(())
                } else {
                    Err(CommandError::MissingPermissions)
                }
            }
            Guard::UserPermissions(required) => {
                if ctx.guild()?.author.has_permissions(*required) {
                    Ok(())
                } else {
                    Err(CommandError::MissingPermissions)
                }
            }
            Guard::BotPermissions(required) => {
                let missing = ctx.guild()?.me.missing_permissions(*required);
                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(CommandError::BotMissingPermissions(
                        missing
                            .get_permission_names()
                            .into_iter()
                            .map(str::to_string)
                            .collect(),
                    ))
                }
            }
        }
    }
}

/// Runs every guard in order and stops at the first failure.
pub async fn check_all(mut guards: Vec<Guard>, ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    guards.sort_by_key(Guard::rank);

    for guard in &guards {
        guard.check(ctx).await?;
    }

    Ok(())
}
