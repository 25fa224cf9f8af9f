//! Informational and fun commands.

use std::sync::Arc;

use async_trait::async_trait;
use rand::{seq::IndexedRandom, Rng};
use serenity::all::Permissions;

use crate::{
    command::{convert, Args, Command, CommandContext, Cooldown, Guard},
    data::UserDataRepository,
    error::command::CommandError,
    model::{
        moderation::ModerationRecord,
        platform::{Owners, RoleInfo, Target},
        reply::{Embed, Reply},
    },
    module::{Module, Registry},
    util::{
        embed::{fit, EMPTY_VALUE},
        format,
    },
};

/// Permissions requested by the invite link.
fn invite_permissions() -> Permissions {
    Permissions::KICK_MEMBERS
        | Permissions::BAN_MEMBERS
        | Permissions::ADD_REACTIONS
        | Permissions::VIEW_AUDIT_LOG
        | Permissions::VIEW_CHANNEL
        | Permissions::SEND_MESSAGES
        | Permissions::MANAGE_MESSAGES
        | Permissions::READ_MESSAGE_HISTORY
        | Permissions::EMBED_LINKS
        | Permissions::ATTACH_FILES
        | Permissions::MENTION_EVERYONE
        | Permissions::USE_EXTERNAL_EMOJIS
        | Permissions::CHANGE_NICKNAME
        | Permissions::MANAGE_NICKNAMES
        | Permissions::MANAGE_ROLES
        | Permissions::MANAGE_GUILD_EXPRESSIONS
}

const SUDO_RESPONSES: [&str; 5] = [
    "Who do you think you are?",
    "What do you think you're doing?",
    "I can't let that happen.",
    "I don't like where you're going with your commands.",
    "`sudo` your mom.",
];

pub struct OtherModule;

impl Module for OtherModule {
    fn name(&self) -> &'static str {
        "other"
    }

    fn install(&self, registry: &mut Registry) {
        let name = self.name();
        registry.add_command(name, Arc::new(About));
        registry.add_command(name, Arc::new(Who));
        registry.add_command(name, Arc::new(GetAvatar));
        registry.add_command(name, Arc::new(Coin));
        registry.add_command(name, Arc::new(Choice));
        registry.add_command(name, Arc::new(Sudo));
    }
}

struct About;

#[async_trait]
impl Command for About {
    fn name(&self) -> &'static str {
        "about"
    }

    fn usage(&self) -> &'static str {
        "about"
    }

    fn cooldown(&self) -> Option<Cooldown> {
        Some(Cooldown::guild(15))
    }

    async fn run(&self, ctx: &CommandContext<'_>, _args: Args) -> Result<(), CommandError> {
        let info = ctx.bot.platform.application_info().await?;

        let invite = format!(
            "https://discord.com/oauth2/authorize?client_id={}&scope=bot&permissions={}",
            info.id,
            invite_permissions().bits()
        );
        let mut links = format!(" - [Invite me!]({invite})");
        let repository = env!("CARGO_PKG_REPOSITORY");
        if !repository.is_empty() {
            links.push_str(&format!("\n - [Check out my source code!]({repository})"));
        }

        let authors = match &info.owners {
            Owners::Single(id) => format!("<@{id}>"),
            Owners::Team(ids) => ids
                .iter()
                .map(|id| format!("<@{id}>"))
                .collect::<Vec<_>>()
                .join(", "),
        };

        let description = ctx
            .bot
            .config()
            .await
            .settings()
            .description
            .clone()
            .filter(|text| !text.is_empty())
            .unwrap_or(info.description);

        let embed = Embed::new()
            .title("About me")
            .field("Name:", info.name, false)
            .field("Description:", or_placeholder(description), false)
            .field("Author:", or_placeholder(authors), false)
            .field("Links:", links, false)
            .footer(format!("v{}", env!("CARGO_PKG_VERSION")));

        ctx.send(Reply::embed(fit(embed))).await?;
        Ok(())
    }
}

/// Embed fields must not be empty.
fn or_placeholder(value: String) -> String {
    if value.is_empty() {
        EMPTY_VALUE.to_string()
    } else {
        value
    }
}

fn stats(record: Option<ModerationRecord>) -> String {
    let record = record.unwrap_or_default();
    format!(
        "Current warnings: {}\nTimes warned: {}\nTimes kicked: {}\nTimes banned: {}",
        record.current_warns, record.total_warns, record.total_kicks, record.total_bans
    )
}

/// Role mentions from the highest role down, ending with @everyone.
fn role_mentions(role_ids: &[u64], roles: &[RoleInfo]) -> String {
    let mut held: Vec<&RoleInfo> = roles
        .iter()
        .filter(|role| !role.is_everyone && role_ids.contains(&role.id))
        .collect();
    held.sort_by(|a, b| b.position.cmp(&a.position));

    held.iter()
        .map(|role| format!("<@&{}>", role.id))
        .chain(std::iter::once("@everyone".to_string()))
        .collect::<Vec<_>>()
        .join(", ")
}

struct Who;

#[async_trait]
impl Command for Who {
    fn name(&self) -> &'static str {
        "who"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["whois", "info"]
    }

    fn usage(&self) -> &'static str {
        "who <member>"
    }

    fn guards(&self) -> Vec<Guard> {
        vec![Guard::GuildOnly]
    }

    fn cooldown(&self) -> Option<Cooldown> {
        Some(Cooldown::user(5).bypassed_by(Permissions::KICK_MEMBERS))
    }

    async fn run(&self, ctx: &CommandContext<'_>, mut args: Args) -> Result<(), CommandError> {
        let guild = ctx.guild()?;
        let arg = args.rest().ok_or_else(|| ctx.missing_argument("member"))?;
        let target = convert::member_or_user(ctx, &arg).await?;
        let user = target.user();

        if user.id != guild.author.id() && !guild.author.has_permissions(Permissions::KICK_MEMBERS) {
            return Err(CommandError::MissingPermissionsAndNotOnSelf);
        }

        let record = UserDataRepository::new(&ctx.bot.db)
            .find(guild.id, user.id)
            .await?;

        let mut embed = Embed::new()
            .title(format!("User info: {}", user.name))
            .thumbnail(user.avatar_url.clone());

        embed = match &target {
            Target::Member(member) => {
                let roles = ctx.bot.platform.roles(guild.id).await?;
                let mut embed = embed
                    .field("Nickname:", member.display_name(), false)
                    .field("User ID:", user.id.to_string(), false)
                    .field("Created at:", format::datetime(&user.created_at), false)
                    .field(
                        "Joined at:",
                        member
                            .joined_at
                            .as_ref()
                            .map_or_else(|| "Unknown".to_string(), format::datetime),
                        false,
                    );
                if let Some(since) = &member.premium_since {
                    embed = embed.field("Booster since:", format::datetime(since), false);
                }
                embed.field("Roles:", role_mentions(&member.roles, &roles), false)
            }
            Target::User(user) => embed
                .field("Nickname:", user.name.clone(), false)
                .field("User ID:", user.id.to_string(), false)
                .field("Created at:", format::datetime(&user.created_at), false)
                .field("Joined at:", "Not a member", false),
        };

        embed = embed.field("This server stats:", stats(record), false);

        ctx.send(Reply::embed(fit(embed))).await?;
        Ok(())
    }
}

struct GetAvatar;

#[async_trait]
impl Command for GetAvatar {
    fn name(&self) -> &'static str {
        "getpfp"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["getavatar", "getava"]
    }

    fn usage(&self) -> &'static str {
        "getpfp <member>"
    }

    fn cooldown(&self) -> Option<Cooldown> {
        Some(Cooldown::user(5))
    }

    async fn run(&self, ctx: &CommandContext<'_>, mut args: Args) -> Result<(), CommandError> {
        let arg = args.next().ok_or_else(|| ctx.missing_argument("member"))?;

        // Outside of guilds only plain users can be resolved.
        let user = if ctx.guild.is_some() {
            convert::member_or_user(ctx, &arg).await?.user().clone()
        } else {
            convert::user(ctx, &arg).await?
        };

        ctx.say(user.avatar_url).await?;
        Ok(())
    }
}

struct Coin;

#[async_trait]
impl Command for Coin {
    fn name(&self) -> &'static str {
        "coin"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["flip", "toss"]
    }

    fn usage(&self) -> &'static str {
        "coin"
    }

    fn cooldown(&self) -> Option<Cooldown> {
        Some(Cooldown::user(5))
    }

    async fn run(&self, ctx: &CommandContext<'_>, _args: Args) -> Result<(), CommandError> {
        let heads = rand::rng().random_bool(0.5);
        let result = if heads { "**Heads!**" } else { "**Tails!**" };

        ctx.say(result).await?;
        Ok(())
    }
}

struct Choice;

#[async_trait]
impl Command for Choice {
    fn name(&self) -> &'static str {
        "choice"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["select"]
    }

    fn usage(&self) -> &'static str {
        "choice [choices...]"
    }

    fn cooldown(&self) -> Option<Cooldown> {
        Some(Cooldown::user(5))
    }

    async fn run(&self, ctx: &CommandContext<'_>, mut args: Args) -> Result<(), CommandError> {
        let choices = args.remaining();

        let picked = {
            let mut rng = rand::rng();
            choices.choose(&mut rng).cloned()
        };
        let response = match picked {
            Some(choice) => format!("**{choice}**"),
            None => format!("Nothing to `{}` from.", ctx.invoked_with),
        };

        ctx.say(response).await?;
        Ok(())
    }
}

struct Sudo;

#[async_trait]
impl Command for Sudo {
    fn name(&self) -> &'static str {
        "sudo"
    }

    fn usage(&self) -> &'static str {
        "sudo [command]"
    }

    fn cooldown(&self) -> Option<Cooldown> {
        Some(Cooldown::user(5))
    }

    async fn run(&self, ctx: &CommandContext<'_>, _args: Args) -> Result<(), CommandError> {
        let response = {
            let mut rng = rand::rng();
            SUDO_RESPONSES.choose(&mut rng).copied().unwrap_or(SUDO_RESPONSES[0])
        };

        ctx.say(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::test::{
        Harness, ADMIN_ID, MEMBER_ID, MEMBER_ROLE_ID, MOD_ID, OTHER_MEMBER_ID,
        STRANGER_ID,
    };

    #[test]
    fn renders_zeroed_stats_without_record() {
        assert_eq!(
            stats(None),
            "Current warnings: 0\nTimes warned: 0\nTimes kicked: 0\nTimes banned: 0"
        );
    }

    #[tokio::test]
    async fn coin_lands_on_a_side() {
        let h = Harness::new().await;

        h.run(MEMBER_ID, "!flip").await;

        let text = h.platform.last_text().unwrap();
        assert!(text == "**Heads!**" || text == "**Tails!**");
    }

    #[tokio::test]
    async fn coin_has_a_user_cooldown() {
        let h = Harness::new().await;

        h.run(MEMBER_ID, "!coin").await;
        h.run(OTHER_MEMBER_ID, "!coin").await;
        h.run(MEMBER_ID, "!coin").await;

        let texts = h.platform.sent_texts();
        assert_eq!(texts.len(), 3);
        assert!(!texts[1].starts_with("This command is on cooldown."));
        assert!(texts[2].starts_with("This command is on cooldown. Try again in **"));
    }

    #[tokio::test]
    async fn choice_picks_one_of_the_options() {
        let h = Harness::new().await;

        h.run(MEMBER_ID, "!choice tea \"hot chocolate\"").await;

        let text = h.platform.last_text().unwrap();
        assert!(text == "**tea**" || text == "**hot chocolate**");
    }

    #[tokio::test]
    async fn choice_without_options_names_the_alias() {
        let h = Harness::new().await;

        h.run(MEMBER_ID, "!select").await;

        assert_eq!(
            h.platform.last_text().as_deref(),
            Some("Nothing to `select` from.")
        );
    }

    #[tokio::test]
    async fn getpfp_sends_the_avatar_url() {
        let h = Harness::new().await;

        h.run(MEMBER_ID, &format!("!getava <@{STRANGER_ID}>")).await;

        assert_eq!(
            h.platform.last_text(),
            Some(h.user(STRANGER_ID).avatar_url)
        );
    }

    #[tokio::test]
    async fn who_shows_member_details_and_counters() {
        let h = Harness::new().await;
        h.run(MOD_ID, &format!("!warn <@{MEMBER_ID}>")).await;

        h.run(MEMBER_ID, &format!("!who <@{MEMBER_ID}>")).await;

        let embed = h.platform.last_reply().unwrap().embed.unwrap();
        assert_eq!(embed.title.as_deref(), Some("User info: member"));
        let field = |name: &str| {
            embed
                .fields
                .iter()
                .find(|field| field.name == name)
                .map(|field| field.value.clone())
        };
        assert_eq!(field("User ID:"), Some(MEMBER_ID.to_string()));
        assert_eq!(
            field("Roles:"),
            Some(format!("<@&{MEMBER_ROLE_ID}>, @everyone"))
        );
        assert_eq!(
            field("This server stats:").as_deref(),
            Some("Current warnings: 1\nTimes warned: 1\nTimes kicked: 0\nTimes banned: 0")
        );
        assert!(field("Booster since:").is_none());
    }

    #[tokio::test]
    async fn who_marks_non_members() {
        let h = Harness::new().await;

        h.run(ADMIN_ID, &format!("!whois {STRANGER_ID}")).await;

        let embed = h.platform.last_reply().unwrap().embed.unwrap();
        assert!(embed
            .fields
            .iter()
            .any(|field| field.name == "Joined at:" && field.value == "Not a member"));
        assert!(!embed.fields.iter().any(|field| field.name == "Roles:"));
    }

    #[tokio::test]
    async fn who_on_others_needs_kick_permission() {
        let h = Harness::new().await;

        h.run(MEMBER_ID, &format!("!who <@{OTHER_MEMBER_ID}>")).await;

        assert_eq!(
            h.platform.last_text().as_deref(),
            Some("You don't have permissions to use this command on other people.")
        );
    }

    #[tokio::test]
    async fn who_cooldown_is_bypassed_by_moderators() {
        let h = Harness::new().await;

        h.run(MOD_ID, &format!("!who <@{MEMBER_ID}>")).await;
        h.run(MOD_ID, &format!("!who <@{OTHER_MEMBER_ID}>")).await;

        let state = h.platform.state();
        assert_eq!(state.sent.len(), 2);
        assert!(state.sent.iter().all(|(_, reply)| reply.embed.is_some()));
    }

    #[tokio::test]
    async fn about_describes_the_application() {
        let h = Harness::new().await;
        h.platform.state().owners = vec![OTHER_MEMBER_ID];

        h.run(MEMBER_ID, "!about").await;

        let embed = h.platform.last_reply().unwrap().embed.unwrap();
        assert_eq!(embed.title.as_deref(), Some("About me"));
        assert_eq!(embed.fields[0].value, "modbot");
        assert_eq!(embed.fields[1].value, "A moderation bot");
        assert_eq!(embed.fields[2].value, format!("<@{OTHER_MEMBER_ID}>"));
        assert!(embed.fields[3].value.contains("client_id=1"));
        assert_eq!(embed.footer, Some(format!("v{}", env!("CARGO_PKG_VERSION"))));
    }
}
