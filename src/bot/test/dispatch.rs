use serenity::all::Permissions;
use test_utils::factory::{custom_command::CustomCommandFactory, guild_config::GuildConfigFactory};

use crate::{
    bot::{
        mock,
        test::{Harness, ADMIN_ID, BOT_ID, CHANNEL_ID, GUILD_ID, MEMBER_ID},
    },
    data::GuildConfigRepository,
};

const NEW_GUILD_ID: u64 = 3_000;
const DM_CHANNEL_ID: u64 = 7_000;

/// Tests that a joined guild gets a configuration row usable right away.
///
/// Expected: default row created on join, prefix change stored and cached
#[tokio::test]
async fn joined_guild_is_configurable() {
    let h = Harness::new().await;

    let settings = h.bot.on_guild_join(NEW_GUILD_ID).await.unwrap();
    assert_eq!(settings.prefix, "!");

    let admin = mock::member(h.user(ADMIN_ID), NEW_GUILD_ID, 3, Permissions::ADMINISTRATOR);
    let me = mock::member(h.user(BOT_ID), NEW_GUILD_ID, 5, Permissions::all());
    h.platform.add_member(admin);
    h.platform.add_member(me);

    let message = mock::message(1, CHANNEL_ID, Some(NEW_GUILD_ID), &h.user(ADMIN_ID), "!prefix $");
    h.bot.handle_message(message).await;

    assert_eq!(h.platform.last_text().unwrap(), "Set command prefix to `$`.");
    assert_eq!(h.bot.cache.prefix(NEW_GUILD_ID).as_deref(), Some("$"));
    let stored = GuildConfigRepository::new(&h.bot.db)
        .find(NEW_GUILD_ID)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.prefix, "$");
}

/// Tests that mentioning the bot works as a prefix in both mention forms.
///
/// Expected: a reply for each mention form
#[tokio::test]
async fn accepts_mention_prefixes() {
    let h = Harness::new().await;

    h.run(MEMBER_ID, "<@10> coin").await;
    h.run(ADMIN_ID, "<@!10> choice pizza").await;

    let texts = h.platform.sent_texts();
    assert_eq!(texts.len(), 2);
    assert_eq!(texts[1], "**pizza**");
}

/// Tests that messages written by bots never run commands.
///
/// Expected: nothing sent
#[tokio::test]
async fn ignores_bot_authors() {
    let h = Harness::new().await;

    h.run(BOT_ID, "!coin").await;

    assert!(h.platform.state().sent.is_empty());
}

/// Tests that unknown commands and wrong casing are ignored by default.
///
/// Expected: nothing sent
#[tokio::test]
async fn unknown_commands_are_silent() {
    let h = Harness::new().await;

    h.run(MEMBER_ID, "!nonexistent").await;
    h.run(MEMBER_ID, "!COIN").await;
    h.run(MEMBER_ID, "coin").await;

    assert!(h.platform.state().sent.is_empty());
}

/// Tests that case-insensitive matching can be turned on in the settings.
///
/// Expected: "!COIN" answered
#[tokio::test]
async fn case_insensitive_setting() {
    let h = Harness::with_config(
        r#"{"token": "token", "def_prefix": "!", "shard_count": 1, "owner_id": 11, "case_insensitive": true}"#,
    )
    .await;
    h.bot.on_connected(0, BOT_ID, &[GUILD_ID]).await.unwrap();

    h.run(MEMBER_ID, "!COIN").await;

    assert_eq!(h.platform.sent_texts().len(), 1);
}

/// Tests that guild commands refuse to run in private messages.
///
/// Expected: NoPrivateMessage answer for a mention-prefixed DM, silence for the guild prefix
#[tokio::test]
async fn guild_commands_in_private_messages() {
    let h = Harness::new().await;
    let author = h.user(MEMBER_ID);

    h.bot
        .handle_message(mock::message(1, DM_CHANNEL_ID, None, &author, "!who"))
        .await;
    assert!(h.platform.state().sent.is_empty());

    h.bot
        .handle_message(mock::message(2, DM_CHANNEL_ID, None, &author, "<@10> who"))
        .await;
    assert_eq!(
        h.platform.last_text().unwrap(),
        "Command `who` cannot be used in private messages."
    );
    assert_eq!(h.platform.state().sent[0].0, DM_CHANNEL_ID);
}

/// Tests that custom commands answer when the guild enables them.
///
/// Expected: stored response sent
#[tokio::test]
async fn runs_enabled_custom_commands() {
    let h = Harness::disconnected().await;
    let db = h.test.db.as_ref().unwrap();
    GuildConfigFactory::new(db)
        .guild_id(GUILD_ID as i64)
        .enable_cc(true)
        .build()
        .await
        .unwrap();
    CustomCommandFactory::new(db, GUILD_ID as i64)
        .command("hello")
        .response("Hi there!")
        .build()
        .await
        .unwrap();
    h.bot.on_connected(0, BOT_ID, &[GUILD_ID]).await.unwrap();

    h.run(MEMBER_ID, "!hello").await;

    assert_eq!(h.platform.last_text().unwrap(), "Hi there!");
}

/// Tests that custom commands stay silent while the guild has them disabled.
///
/// Expected: nothing sent
#[tokio::test]
async fn skips_disabled_custom_commands() {
    let h = Harness::disconnected().await;
    let db = h.test.db.as_ref().unwrap();
    GuildConfigFactory::new(db)
        .guild_id(GUILD_ID as i64)
        .build()
        .await
        .unwrap();
    CustomCommandFactory::new(db, GUILD_ID as i64)
        .command("hello")
        .build()
        .await
        .unwrap();
    h.bot.on_connected(0, BOT_ID, &[GUILD_ID]).await.unwrap();

    h.run(MEMBER_ID, "!hello").await;

    assert!(h.platform.state().sent.is_empty());
}

/// Tests that a second use within the cooldown is refused with the remaining time.
///
/// Expected: cooldown notice on the second coin flip
#[tokio::test]
async fn reports_cooldowns() {
    let h = Harness::new().await;

    h.run(MEMBER_ID, "!coin").await;
    h.run(MEMBER_ID, "!flip").await;

    let text = h.platform.last_text().unwrap();
    assert!(text.starts_with("This command is on cooldown. Try again in **"));
}
