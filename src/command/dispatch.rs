use crate::{
    bot::Bot,
    command::{guard, Args, CommandContext, GuildContext},
    error::command::CommandError,
    model::{platform::ChannelMessage, reply::Reply},
};

const GENERIC_FAILURE: &str = "Something went wrong while running this command.";

/// Splits a message into the matched prefix, the invoked name and the argument text.
///
/// Prefixes are tried in the given order, so longer candidates must come first.
pub fn parse<'m>(
    content: &'m str,
    prefixes: &[String],
    strip_after_prefix: bool,
) -> Option<(String, &'m str, &'m str)> {
    let prefix = prefixes.iter().find(|p| content.starts_with(p.as_str()))?;

    let mut rest = &content[prefix.len()..];
    if strip_after_prefix {
        rest = rest.trim_start();
    }

    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let (name, args) = rest.split_at(end);
    if name.is_empty() {
        return None;
    }

    Some((prefix.clone(), name, args))
}

/// Runs the command a message invokes, if any.
///
/// Command failures never escape: classified ones are answered in the channel, everything
/// else is logged and answered with a generic line.
pub async fn dispatch(bot: &Bot, message: &ChannelMessage) {
    let prefixes = bot.prefixes_for(message.guild_id);
    let Some((prefix, name, raw_args)) =
        parse(&message.content, &prefixes, bot.strip_after_prefix())
    else {
        return;
    };

    let command = bot.modules().await.command(name, bot.case_insensitive());
    let Some(command) = command else {
        run_custom_command(bot, message, name).await;
        return;
    };

    let guild = match message.guild_id {
        Some(guild_id) => match guild_context(bot, guild_id, message.author.id).await {
            Ok(guild) => guild,
            Err(e) => {
                tracing::error!(
                    "Failed to resolve guild context for command {} in guild {}: {:?}",
                    command.name(),
                    guild_id,
                    e
                );
                return;
            }
        },
        None => None,
    };

    let ctx = CommandContext {
        bot,
        message,
        prefix,
        invoked_with: name.to_string(),
        command: command.name(),
        usage: command.usage(),
        guild,
    };

    let result = async {
        guard::check_all(command.guards(), &ctx).await?;

        let cooldown = command.cooldown().filter(|cooldown| {
            !cooldown.bypass.is_some_and(|required| {
                ctx.guild
                    .as_ref()
                    .is_some_and(|guild| guild.author.has_permissions(required))
            })
        });
        if let Some(cooldown) = cooldown {
            bot.cooldowns()
                .hit(command.name(), &cooldown, message)
                .map_err(CommandError::OnCooldown)?;
        }

        command.run(&ctx, Args::new(raw_args)).await
    }
    .await;

    if let Err(err) = result {
        report(&ctx, err).await;
    }
}

async fn guild_context(
    bot: &Bot,
    guild_id: u64,
    author_id: u64,
) -> Result<Option<GuildContext>, CommandError> {
    let platform = &bot.platform;

    let Some(author) = platform.member(guild_id, author_id).await? else {
        return Ok(None);
    };
    let Some(me) = platform.member(guild_id, bot.user_id()).await? else {
        return Ok(None);
    };
    let name = platform
        .guild_name(guild_id)
        .await
        .unwrap_or_else(|| guild_id.to_string());

    Ok(Some(GuildContext {
        id: guild_id,
        name,
        author,
        me,
    }))
}

async fn run_custom_command(bot: &Bot, message: &ChannelMessage, name: &str) {
    let Some(guild_id) = message.guild_id else {
        return;
    };
    if !bot.cache.guild(guild_id).is_some_and(|guild| guild.enable_cc) {
        return;
    }
    let Some(custom) = bot.cache.custom_command(guild_id, name) else {
        return;
    };

    if let Err(e) = bot
        .platform
        .send(message.channel_id, Reply::text(custom.response))
        .await
    {
        tracing::error!("Failed to send custom command {}: {:?}", name, e);
    }
}

async fn report(ctx: &CommandContext<'_>, err: CommandError) {
    let text = match err.user_message() {
        Some(text) => text,
        None => {
            tracing::error!(
                "Failed to run command {} (message {}): {:?}",
                ctx.command,
                ctx.message.id,
                err
            );
            GENERIC_FAILURE.to_string()
        }
    };

    if let Err(e) = ctx.say(text).await {
        tracing::error!("Failed to report error of command {}: {:?}", ctx.command, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes() -> Vec<String> {
        vec!["<@!42> ".to_string(), "<@42> ".to_string(), "!".to_string()]
    }

    #[test]
    fn splits_prefix_name_and_arguments() {
        let (prefix, name, args) = parse("!warn <@1> spam", &prefixes(), false).unwrap();

        assert_eq!(prefix, "!");
        assert_eq!(name, "warn");
        assert_eq!(args, " <@1> spam");
    }

    #[test]
    fn accepts_mentions_as_prefix() {
        let (prefix, name, _) = parse("<@42> ping", &prefixes(), false).unwrap();

        assert_eq!(prefix, "<@42> ");
        assert_eq!(name, "ping");
    }

    #[test]
    fn whitespace_after_prefix_depends_on_setting() {
        assert!(parse("! ping", &prefixes(), false).is_none());
        assert_eq!(parse("! ping", &prefixes(), true).map(|(_, n, _)| n), Some("ping"));
    }

    #[test]
    fn ignores_unprefixed_messages() {
        assert!(parse("hello there", &prefixes(), true).is_none());
        assert!(parse("!", &prefixes(), true).is_none());
    }
}
