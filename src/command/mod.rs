//! Chat command framework: the `Command` trait, the per-invocation context, argument
//! tokenizing and conversion, guards and cooldowns, and the dispatcher tying them together.

pub mod args;
pub mod convert;
pub mod cooldown;
pub mod dispatch;
pub mod guard;

use async_trait::async_trait;

pub use args::Args;
pub use cooldown::{Bucket, Cooldown, Cooldowns};
pub use guard::Guard;

use crate::{
    bot::Bot,
    error::{command::CommandError, platform::PlatformError},
    model::{
        platform::{ChannelMessage, MemberInfo},
        reply::Reply,
    },
};

#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;

    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Invocation syntax without the prefix, e.g. `warn <member> [reason]`.
    fn usage(&self) -> &'static str;

    fn guards(&self) -> Vec<Guard> {
        Vec::new()
    }

    fn cooldown(&self) -> Option<Cooldown> {
        None
    }

    async fn run(&self, ctx: &CommandContext<'_>, args: Args) -> Result<(), CommandError>;
}

/// Guild-side view of an invocation.
#[derive(Debug, Clone)]
pub struct GuildContext {
    pub id: u64,
    pub name: String,
    pub author: MemberInfo,
    /// The bot's own member.
    pub me: MemberInfo,
}

pub struct CommandContext<'a> {
    pub bot: &'a Bot,
    pub message: &'a ChannelMessage,
    pub prefix: String,
    pub invoked_with: String,
    pub command: &'static str,
    pub usage: &'static str,
    pub guild: Option<GuildContext>,
}

impl CommandContext<'_> {
    /// Guild of the invocation; commands that need one fail in private messages.
    pub fn guild(&self) -> Result<&GuildContext, CommandError> {
        self.guild
            .as_ref()
            .ok_or_else(|| CommandError::NoPrivateMessage(self.command.to_string()))
    }

    pub fn author_id(&self) -> u64 {
        self.message.author.id
    }

    pub fn channel_id(&self) -> u64 {
        self.message.channel_id
    }

    pub async fn send(&self, reply: Reply) -> Result<u64, PlatformError> {
        self.bot.platform.send(self.message.channel_id, reply).await
    }

    pub async fn say(&self, content: impl Into<String>) -> Result<u64, PlatformError> {
        self.send(Reply::text(content)).await
    }

    /// Sends a reply referencing the invoking message.
    pub async fn reply(&self, reply: Reply) -> Result<u64, PlatformError> {
        self.send(reply.reference(self.message.id)).await
    }

    pub async fn reply_text(&self, content: impl Into<String>) -> Result<u64, PlatformError> {
        self.reply(Reply::text(content)).await
    }

    /// Full syntax line including the prefix the command was invoked with.
    pub fn syntax(&self) -> String {
        format!("{}{}", self.prefix, self.usage)
    }

    pub fn missing_argument(&self, name: &str) -> CommandError {
        CommandError::MissingArgument {
            name: name.to_string(),
            usage: self.syntax(),
        }
    }

    /// Missing argument of a subcommand with its own syntax line.
    pub fn missing_argument_in(&self, usage: &str, name: &str) -> CommandError {
        CommandError::MissingArgument {
            name: name.to_string(),
            usage: format!("{}{}", self.prefix, usage),
        }
    }

    pub fn missing_subcommand(&self) -> CommandError {
        CommandError::MissingSubcommand {
            usage: self.syntax(),
        }
    }
}
