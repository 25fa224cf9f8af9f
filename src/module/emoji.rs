//! Emoji role gating.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serenity::all::Permissions;

use crate::{
    command::{convert, Args, Command, CommandContext, Guard},
    error::command::CommandError,
    model::{
        platform::{EmojiInfo, RoleInfo},
        reply::{Embed, Reply},
    },
    module::{Module, Registry},
    util::embed::fit,
};

pub struct EmojiModule;

impl Module for EmojiModule {
    fn name(&self) -> &'static str {
        "emoji"
    }

    fn install(&self, registry: &mut Registry) {
        registry.add_command(self.name(), Arc::new(EmojiCommand));
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Action {
    Add,
    Remove,
    Set,
    Get,
}

impl Action {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "addroles" | "addrole" => Some(Action::Add),
            "removeroles" | "removerole" | "rmroles" | "rmrole" => Some(Action::Remove),
            "setroles" | "setrole" => Some(Action::Set),
            "getroles" | "getrole" | "parameters" | "params" => Some(Action::Get),
            _ => None,
        }
    }

    fn usage(self) -> &'static str {
        match self {
            Action::Add => "emoji addroles <emoji> <roles...>",
            Action::Remove => "emoji removeroles <emoji> <roles...>",
            Action::Set => "emoji setroles <emoji> [roles...]",
            Action::Get => "emoji getroles [emoji]",
        }
    }
}

fn role_names(role_ids: &[u64], roles: &HashMap<u64, RoleInfo>) -> Vec<String> {
    role_ids
        .iter()
        .filter_map(|id| roles.get(id))
        .map(|role| format!("**{}**", role.name.replace('@', "@\u{200b}")))
        .collect()
}

fn availability(emoji: &EmojiInfo, role_ids: &[u64], roles: &HashMap<u64, RoleInfo>) -> String {
    let names = role_names(role_ids, roles);
    let allowed = if names.is_empty() {
        "everyone".to_string()
    } else {
        names.join(", ")
    };

    format!("Emote {} is available to: {allowed}.", emoji.mention())
}

/// Overview of every gated emoji, `None` when no emoji is restricted.
fn settings_embed(emojis: &[EmojiInfo], roles: &HashMap<u64, RoleInfo>) -> Option<Embed> {
    let (mut static_lines, mut animated_lines) = (Vec::new(), Vec::new());

    for emoji in emojis.iter().filter(|emoji| !emoji.roles.is_empty()) {
        let line = format!("{}: {}", emoji.mention(), role_names(&emoji.roles, roles).join(", "));
        if emoji.animated {
            animated_lines.push(line);
        } else {
            static_lines.push(line);
        }
    }

    if static_lines.is_empty() && animated_lines.is_empty() {
        return None;
    }

    let mut embed = Embed::new().title("Emote settings");
    if !static_lines.is_empty() {
        embed = embed.field("Static emotes:", static_lines.join("\n"), false);
    }
    if !animated_lines.is_empty() {
        embed = embed.field("Animated emotes:", animated_lines.join("\n"), false);
    }

    Some(fit(embed))
}

struct EmojiCommand;

impl EmojiCommand {
    async fn update_roles(
        &self,
        ctx: &CommandContext<'_>,
        action: Action,
        mut args: Args,
    ) -> Result<(), CommandError> {
        let guild = ctx.guild()?;

        let arg = args
            .next()
            .ok_or_else(|| ctx.missing_argument_in(action.usage(), "emoji"))?;
        let emoji = convert::local_emoji(ctx, &arg).await?;
        let given: Vec<u64> = convert::roles_greedy(ctx, &mut args)
            .await?
            .into_iter()
            .map(|role| role.id)
            .collect();

        if given.is_empty() && action != Action::Set {
            return Err(ctx.missing_argument_in(action.usage(), "roles"));
        }

        let mut required = match action {
            Action::Add => emoji.roles.iter().copied().chain(given).collect(),
            Action::Remove => emoji
                .roles
                .iter()
                .copied()
                .filter(|id| !given.contains(id))
                .collect(),
            Action::Set | Action::Get => given,
        };
        let mut seen = Vec::with_capacity(required.len());
        required.retain(|id| {
            let fresh = !seen.contains(id);
            seen.push(*id);
            fresh
        });

        ctx.bot
            .platform
            .set_emoji_roles(guild.id, emoji.id, &required)
            .await?;
        tracing::info!(
            "Restricted emoji {} in guild {} to {} role(s)",
            emoji.id,
            guild.id,
            required.len()
        );

        let roles = roles_by_id(ctx).await?;
        ctx.reply_text(availability(&emoji, &required, &roles)).await?;
        Ok(())
    }

    async fn get_roles(&self, ctx: &CommandContext<'_>, mut args: Args) -> Result<(), CommandError> {
        let guild = ctx.guild()?;
        let roles = roles_by_id(ctx).await?;

        if let Some(arg) = args.next() {
            let emoji = convert::local_emoji(ctx, &arg).await?;
            ctx.reply_text(availability(&emoji, &emoji.roles, &roles))
                .await?;
            return Ok(());
        }

        let emojis = ctx.bot.platform.emojis(guild.id).await?;
        if emojis.is_empty() {
            ctx.reply_text("This server does not have custom emotes.")
                .await?;
            return Ok(());
        }

        match settings_embed(&emojis, &roles) {
            Some(embed) => ctx.reply(Reply::embed(embed)).await?,
            None => ctx.reply_text("All emotes are available to everyone.").await?,
        };

        Ok(())
    }
}

async fn roles_by_id(ctx: &CommandContext<'_>) -> Result<HashMap<u64, RoleInfo>, CommandError> {
    let guild = ctx.guild()?;

    Ok(ctx
        .bot
        .platform
        .roles(guild.id)
        .await?
        .into_iter()
        .map(|role| (role.id, role))
        .collect())
}

#[async_trait]
impl Command for EmojiCommand {
    fn name(&self) -> &'static str {
        "emoji"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["emote"]
    }

    fn usage(&self) -> &'static str {
        "emoji <addroles/removeroles/setroles/getroles>"
    }

    fn guards(&self) -> Vec<Guard> {
        vec![
            Guard::GuildOnly,
            Guard::UserPermissions(Permissions::MANAGE_GUILD_EXPRESSIONS),
            Guard::BotPermissions(Permissions::MANAGE_GUILD_EXPRESSIONS),
        ]
    }

    async fn run(&self, ctx: &CommandContext<'_>, mut args: Args) -> Result<(), CommandError> {
        let action = args
            .next()
            .and_then(|name| Action::parse(&name))
            .ok_or_else(|| ctx.missing_subcommand())?;

        match action {
            Action::Get => self.get_roles(ctx, args).await,
            _ => self.update_roles(ctx, action, args).await,
        }
    }
}
