//! Core commands: latency, prefix and log channel settings, presence, process control and
//! module management. This module cannot be unloaded.

use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use serde_json::Value;

use crate::{
    bot::ExitCode,
    command::{convert, Args, Command, CommandContext, Cooldown, Guard},
    data::GuildConfigRepository,
    error::{command::CommandError, module::ModuleError, AppError},
    model::reply::{Embed, Reply, COLOR_GREEN, COLOR_ORANGE, COLOR_RED},
    module::{Module, Registry},
    util::{embed::EMPTY_VALUE, format::dash_list, prefix::validate_prefix},
};

const GOODBYE_MESSAGES: [&str; 8] = [
    "Shutting down...",
    "`Oh no`",
    "Not again!",
    "I don't want to die...",
    "Goodbye cruel world...",
    "It has been a privilege chatting with you tonight.",
    "You're next...",
    "`I'll be back`",
];

pub struct RootModule;

impl Module for RootModule {
    fn name(&self) -> &'static str {
        "root"
    }

    fn protected(&self) -> bool {
        true
    }

    fn install(&self, registry: &mut Registry) {
        let name = self.name();
        registry.add_command(name, Arc::new(Ping));
        registry.add_command(name, Arc::new(Prefix));
        registry.add_command(name, Arc::new(LogChannel));
        registry.add_command(name, Arc::new(Activity));
        registry.add_command(name, Arc::new(Shutdown));
        registry.add_command(name, Arc::new(Restart));
        registry.add_command(name, Arc::new(ModuleCommand));
    }
}

fn latency_color(ms: u128) -> u32 {
    match ms {
        0..=149 => COLOR_GREEN,
        150..=199 => COLOR_ORANGE,
        _ => COLOR_RED,
    }
}

struct Ping;

#[async_trait]
impl Command for Ping {
    fn name(&self) -> &'static str {
        "ping"
    }

    fn usage(&self) -> &'static str {
        "ping"
    }

    fn guards(&self) -> Vec<Guard> {
        vec![Guard::OwnerOrAdmin]
    }

    fn cooldown(&self) -> Option<Cooldown> {
        Some(Cooldown::guild(5))
    }

    async fn run(&self, ctx: &CommandContext<'_>, _args: Args) -> Result<(), CommandError> {
        let ms = ctx
            .bot
            .platform
            .latency()
            .await
            .map_or(0, |latency| latency.as_millis());

        let embed = Embed::new()
            .field(format!("Pong! {ms} ms"), EMPTY_VALUE, true)
            .color(latency_color(ms));

        ctx.reply(Reply::embed(embed)).await?;
        Ok(())
    }
}

struct Prefix;

#[async_trait]
impl Command for Prefix {
    fn name(&self) -> &'static str {
        "prefix"
    }

    fn usage(&self) -> &'static str {
        "prefix [new_prefix]"
    }

    fn guards(&self) -> Vec<Guard> {
        vec![Guard::GuildOnly, Guard::OwnerOrAdmin]
    }

    async fn run(&self, ctx: &CommandContext<'_>, mut args: Args) -> Result<(), CommandError> {
        let guild = ctx.guild()?;

        let (requested, response) = match args.next() {
            Some(prefix) => (prefix, "Set command prefix to"),
            None => (
                ctx.bot.default_prefix().to_string(),
                "Reset command prefix back to",
            ),
        };
        let prefix = validate_prefix(&requested)?;

        let settings = GuildConfigRepository::new(&ctx.bot.db)
            .set_prefix(guild.id, &prefix)
            .await?;
        ctx.bot.cache.insert_guild(settings);

        tracing::info!("Guild {} changed its prefix to {:?}", guild.id, prefix);

        ctx.reply_text(format!("{response} `{prefix}`.")).await?;
        Ok(())
    }
}

struct LogChannel;

#[async_trait]
impl Command for LogChannel {
    fn name(&self) -> &'static str {
        "logchannel"
    }

    fn usage(&self) -> &'static str {
        "logchannel [channel]"
    }

    fn guards(&self) -> Vec<Guard> {
        vec![Guard::GuildOnly, Guard::OwnerOrAdmin]
    }

    async fn run(&self, ctx: &CommandContext<'_>, mut args: Args) -> Result<(), CommandError> {
        let guild = ctx.guild()?;
        let channel = args.next().map(|arg| convert::channel_id(&arg)).transpose()?;

        let settings = GuildConfigRepository::new(&ctx.bot.db)
            .set_log_channel(guild.id, channel)
            .await?;
        ctx.bot.cache.insert_guild(settings);

        let response = match channel {
            Some(id) => format!("Set the log channel to <#{id}>."),
            None => "Disabled logging for this server.".to_string(),
        };
        ctx.reply_text(response).await?;
        Ok(())
    }
}

struct Activity;

#[async_trait]
impl Command for Activity {
    fn name(&self) -> &'static str {
        "activity"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["status", "game"]
    }

    fn usage(&self) -> &'static str {
        "activity [text]"
    }

    fn guards(&self) -> Vec<Guard> {
        vec![Guard::Owner]
    }

    async fn run(&self, ctx: &CommandContext<'_>, mut args: Args) -> Result<(), CommandError> {
        // An empty text clears the setting and falls back to the default game.
        let text = args.rest().unwrap_or_default();

        {
            let mut config = ctx.bot.config().await;
            config
                .set("activity_text", Value::String(text))
                .map_err(AppError::from)?;
            config.persist_if_dirty().map_err(AppError::from)?;
        }

        ctx.bot.apply_activity().await;
        Ok(())
    }
}

struct Shutdown;

#[async_trait]
impl Command for Shutdown {
    fn name(&self) -> &'static str {
        "shutdown"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["die", "kill", "slep", "sleep"]
    }

    fn usage(&self) -> &'static str {
        "shutdown"
    }

    fn guards(&self) -> Vec<Guard> {
        vec![Guard::Owner]
    }

    async fn run(&self, ctx: &CommandContext<'_>, _args: Args) -> Result<(), CommandError> {
        let goodbye = {
            let mut rng = rand::rng();
            GOODBYE_MESSAGES
                .choose(&mut rng)
                .copied()
                .unwrap_or(GOODBYE_MESSAGES[0])
        };

        ctx.reply_text(goodbye).await?;
        ctx.bot.shutdown(ExitCode::Quit).await;
        Ok(())
    }
}

struct Restart;

#[async_trait]
impl Command for Restart {
    fn name(&self) -> &'static str {
        "restart"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["reboot"]
    }

    fn usage(&self) -> &'static str {
        "restart"
    }

    fn guards(&self) -> Vec<Guard> {
        vec![Guard::Owner]
    }

    async fn run(&self, ctx: &CommandContext<'_>, _args: Args) -> Result<(), CommandError> {
        ctx.reply_text("Restarting...").await?;
        ctx.bot.shutdown(ExitCode::Restart).await;
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum BatchAction {
    Load,
    Unload,
    Reload,
}

impl BatchAction {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "load" | "l" => Some(BatchAction::Load),
            "unload" | "u" => Some(BatchAction::Unload),
            "reload" | "r" => Some(BatchAction::Reload),
            _ => None,
        }
    }

    fn usage(self) -> &'static str {
        match self {
            BatchAction::Load => "module load <module> [modules...]",
            BatchAction::Unload => "module unload <module> [modules...]",
            BatchAction::Reload => "module reload <module> [modules...]",
        }
    }

    /// Verb in the embed texts, e.g. "loaded" and "Loading".
    fn verbs(self) -> (&'static str, &'static str, &'static str) {
        match self {
            BatchAction::Load => ("load", "loaded", "Loading"),
            BatchAction::Unload => ("unload", "unloaded", "Unloading"),
            BatchAction::Reload => ("reload", "reloaded", "Reloading"),
        }
    }

    fn apply(self, registry: &mut Registry, name: &str) -> Result<(), ModuleError> {
        match self {
            BatchAction::Load => registry.load(name),
            BatchAction::Unload => registry.unload(name),
            BatchAction::Reload => registry.reload(name),
        }
    }

    /// Modules a `*` argument expands to.
    fn wildcard(self, registry: &Registry) -> Vec<String> {
        let names = match self {
            BatchAction::Load => registry.available(),
            BatchAction::Unload | BatchAction::Reload => registry.installed().to_vec(),
        };
        names.into_iter().map(str::to_string).collect()
    }
}

/// Summary embed of a batch module operation.
fn batch_embed(
    action: BatchAction,
    total: usize,
    succeeded: &[String],
    failed: &[(String, String)],
) -> Embed {
    let (verb, past, title) = action.verbs();
    let mut embed = Embed::new().title(format!("{title} modules"));

    embed = if succeeded.is_empty() {
        embed.field(format!("No modules were {past}"), EMPTY_VALUE, false)
    } else {
        embed.field(
            format!("Successfully {past} the modules ({}/{total}):", succeeded.len()),
            dash_list(succeeded),
            false,
        )
    };

    if !failed.is_empty() {
        let lines = failed
            .iter()
            .map(|(name, reason)| format!("- {name} (reason: {reason})"))
            .collect::<Vec<_>>()
            .join("\n");
        embed = embed.field(
            format!("Failed to {verb} the modules ({}/{total}):", failed.len()),
            lines,
            false,
        );
    }

    let color = match (succeeded.is_empty(), failed.is_empty()) {
        (false, true) => COLOR_GREEN,
        (true, false) => COLOR_RED,
        _ => COLOR_ORANGE,
    };

    embed.color(color)
}

fn stats_embed(registry: &Registry) -> Embed {
    let loaded = registry.installed().to_vec();
    let unloaded: Vec<&str> = registry
        .available()
        .into_iter()
        .filter(|name| !registry.is_installed(name))
        .collect();

    let mut embed = Embed::new().title("Modules").color(COLOR_GREEN);

    embed = if loaded.is_empty() {
        embed.field("No loaded modules", EMPTY_VALUE, false)
    } else {
        embed.field(
            format!("Loaded modules ({}):", loaded.len()),
            dash_list(&loaded),
            false,
        )
    };

    if unloaded.is_empty() {
        embed.field("No unloaded modules", EMPTY_VALUE, false)
    } else {
        embed.field(
            format!("Unloaded modules ({}):", unloaded.len()),
            dash_list(&unloaded),
            false,
        )
    }
}

struct ModuleCommand;

#[async_trait]
impl Command for ModuleCommand {
    fn name(&self) -> &'static str {
        "module"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["modules", "m"]
    }

    fn usage(&self) -> &'static str {
        "module <stats/load/unload/reload>"
    }

    fn guards(&self) -> Vec<Guard> {
        vec![Guard::Owner]
    }

    async fn run(&self, ctx: &CommandContext<'_>, mut args: Args) -> Result<(), CommandError> {
        let subcommand = args.next().ok_or_else(|| ctx.missing_subcommand())?;

        if matches!(subcommand.as_str(), "stats" | "s") {
            let embed = {
                let registry = ctx.bot.modules().await;
                stats_embed(&registry)
            };
            ctx.reply(Reply::embed(embed)).await?;
            return Ok(());
        }

        let action = BatchAction::parse(&subcommand).ok_or_else(|| ctx.missing_subcommand())?;
        let requested = args.remaining();
        if requested.is_empty() {
            return Err(ctx.missing_argument_in(action.usage(), "module"));
        }

        let embed = {
            let mut registry = ctx.bot.modules_mut().await;

            let names = if requested[0] == "*" {
                action.wildcard(&registry)
            } else {
                requested
            };

            let mut succeeded = Vec::new();
            let mut failed = Vec::new();
            for name in &names {
                match action.apply(&mut registry, name) {
                    Ok(()) => succeeded.push(name.clone()),
                    Err(e) => failed.push((name.clone(), e.to_string())),
                }
            }

            batch_embed(action, names.len(), &succeeded, &failed)
        };

        ctx.reply(Reply::embed(embed)).await?;
        Ok(())
    }
}
