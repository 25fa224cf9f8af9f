//! Self-service and moderator role assignment.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::Permissions;

use crate::{
    command::{convert, Args, Command, CommandContext, Guard},
    error::{command::CommandError, platform::PlatformError},
    model::platform::{MemberInfo, RoleInfo},
    module::{Module, Registry},
};

const ADD_USAGE: &str = "role add <role> [member]";
const REMOVE_USAGE: &str = "role remove <role> [member]";

pub struct RolesModule;

impl Module for RolesModule {
    fn name(&self) -> &'static str {
        "roles"
    }

    fn install(&self, registry: &mut Registry) {
        registry.add_command(self.name(), Arc::new(Role));
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Change {
    Add,
    Remove,
}

/// Mentions in role names must not ping anyone when echoed back.
fn escape_mentions(name: &str) -> String {
    name.replace('@', "@\u{200b}")
}

/// Whether `author` may give themselves `role` without the manage-roles permission.
///
/// The role must rank below the author's top role and grant nothing the author lacks.
fn self_assignable(author: &MemberInfo, role: &RoleInfo) -> bool {
    author.has_permissions(Permissions::MANAGE_ROLES)
        || (role.position < author.top_role_position
            && author.missing_permissions(role.permissions).is_empty())
}

/// Resolves the role and the member it applies to, the invoker by default.
///
/// Changing roles of other members needs the manage-roles permission.
async fn resolve(
    ctx: &CommandContext<'_>,
    args: &mut Args,
    usage: &str,
) -> Result<(RoleInfo, MemberInfo), CommandError> {
    let guild = ctx.guild()?;

    let role = args
        .next()
        .ok_or_else(|| ctx.missing_argument_in(usage, "role"))?;
    let role = convert::role(ctx, &role).await?;
    if role.is_everyone {
        return Err(CommandError::BadRole(role.name));
    }

    let member = match args.rest() {
        Some(arg) => convert::member(ctx, &arg).await?,
        None => guild.author.clone(),
    };

    if member.id() != guild.author.id() && !guild.author.has_permissions(Permissions::MANAGE_ROLES) {
        return Err(CommandError::MissingPermissionsAndNotOnSelf);
    }

    Ok((role, member))
}

async fn change_role(ctx: &CommandContext<'_>, mut args: Args, change: Change) -> Result<(), CommandError> {
    let usage = match change {
        Change::Add => ADD_USAGE,
        Change::Remove => REMOVE_USAGE,
    };
    let (role, member) = resolve(ctx, &mut args, usage).await?;
    let guild = ctx.guild()?;

    let name = escape_mentions(&role.name);
    let on_self = member.id() == guild.author.id();
    let has_role = member.roles.contains(&role.id);
    let forbidden = format!("Forbidden. The role **{name}** is managed by Discord.");

    let response = match (change, has_role, on_self) {
        (Change::Add, true, true) => format!("You already have the role **{name}**."),
        (Change::Add, true, false) => {
            format!("The user {} already has the role **{name}**.", member.mention())
        }
        (Change::Remove, false, true) => format!("You have no role **{name}**."),
        (Change::Remove, false, false) => {
            format!("The user {} has no role **{name}**.", member.mention())
        }
        // The platform refuses managed roles and roles at or above the bot's own.
        _ if role.managed || role.position >= guild.me.top_role_position => forbidden,
        (Change::Add, false, _) if !self_assignable(&guild.author, &role) => {
            return Err(CommandError::CannotSelfAssign(name));
        }
        _ => {
            let platform = &ctx.bot.platform;
            let result = match change {
                Change::Add => platform.add_role(guild.id, member.id(), role.id).await,
                Change::Remove => platform.remove_role(guild.id, member.id(), role.id).await,
            };

            match (result, change, on_self) {
                (Err(PlatformError::Forbidden), _, _) => forbidden,
                (Err(e), _, _) => return Err(e.into()),
                (Ok(()), Change::Add, true) => format!("Added the role **{name}** to you."),
                (Ok(()), Change::Add, false) => {
                    format!("Added the role **{name}** to {}.", member.mention())
                }
                (Ok(()), Change::Remove, true) => format!("Removed the role **{name}** from you."),
                (Ok(()), Change::Remove, false) => {
                    format!("Removed the role **{name}** from {}.", member.mention())
                }
            }
        }
    };

    ctx.reply_text(response).await?;
    Ok(())
}

struct Role;

#[async_trait]
impl Command for Role {
    fn name(&self) -> &'static str {
        "role"
    }

    fn usage(&self) -> &'static str {
        "role <add/remove>"
    }

    fn guards(&self) -> Vec<Guard> {
        vec![Guard::GuildOnly]
    }

    async fn run(&self, ctx: &CommandContext<'_>, mut args: Args) -> Result<(), CommandError> {
        let subcommand = args.next().ok_or_else(|| ctx.missing_subcommand())?;

        match subcommand.as_str() {
            "add" | "grant" => change_role(ctx, args, Change::Add).await,
            "remove" | "rm" => change_role(ctx, args, Change::Remove).await,
            _ => Err(ctx.missing_subcommand()),
        }
    }
}
