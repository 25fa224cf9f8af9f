//! Bot-level test harness.
//!
//! `Harness` wires a `Bot` to an in-memory database and a `MockPlatform` populated with one
//! guild, one channel and a handful of members of different standing. The bot is connected
//! and its cache loaded before the harness is returned.

mod dispatch;

use std::{
    io::Write,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use serenity::all::Permissions;
use tempfile::NamedTempFile;
use test_utils::{builder::TestBuilder, context::TestContext};
use tokio::sync::MutexGuard;

use crate::{
    bot::{
        mock::{self, MockPlatform},
        Bot,
    },
    config::RuntimeConfig,
    model::platform::{EmojiInfo, RoleInfo, UserInfo},
};

pub const GUILD_ID: u64 = 1_000;
pub const CHANNEL_ID: u64 = 2_000;
pub const LOG_CHANNEL_ID: u64 = 2_001;

pub const BOT_ID: u64 = 10;
/// Bot owner without any guild permissions.
pub const OWNER_ID: u64 = 11;
pub const ADMIN_ID: u64 = 12;
pub const MOD_ID: u64 = 13;
pub const MEMBER_ID: u64 = 14;
pub const OTHER_MEMBER_ID: u64 = 15;
/// Known user that is not a member of the guild.
pub const STRANGER_ID: u64 = 16;

pub const MEMBER_ROLE_ID: u64 = 300;
pub const MODERATOR_ROLE_ID: u64 = 301;
pub const ADMIN_ROLE_ID: u64 = 302;
pub const BOT_ROLE_ID: u64 = 303;
pub const BOOSTER_ROLE_ID: u64 = 304;
pub const TOP_ROLE_ID: u64 = 305;
/// Self-assignable role without permissions, below every member's top role.
pub const PINGS_ROLE_ID: u64 = 306;

pub const WAVE_EMOJI_ID: u64 = 500;
pub const PARTY_EMOJI_ID: u64 = 501;

pub fn moderator_permissions() -> Permissions {
    Permissions::KICK_MEMBERS
        | Permissions::BAN_MEMBERS
        | Permissions::MANAGE_MESSAGES
        | Permissions::MANAGE_ROLES
        | Permissions::MANAGE_GUILD_EXPRESSIONS
}

fn guild_roles() -> Vec<RoleInfo> {
    vec![
        RoleInfo {
            id: GUILD_ID,
            name: "@everyone".to_string(),
            position: 0,
            managed: false,
            is_everyone: true,
            permissions: Permissions::empty(),
        },
        mock::role(PINGS_ROLE_ID, "Pings", 1),
        mock::role(MEMBER_ROLE_ID, "Member", 2),
        RoleInfo {
            managed: true,
            ..mock::role(BOOSTER_ROLE_ID, "Nitro Booster", 3)
        },
        RoleInfo {
            permissions: moderator_permissions(),
            ..mock::role(MODERATOR_ROLE_ID, "Moderator", 5)
        },
        RoleInfo {
            permissions: Permissions::ADMINISTRATOR,
            ..mock::role(ADMIN_ROLE_ID, "Admin", 8)
        },
        RoleInfo {
            permissions: Permissions::all(),
            ..mock::role(BOT_ROLE_ID, "Bot", 10)
        },
        mock::role(TOP_ROLE_ID, "Top", 12),
    ]
}

fn guild_emojis() -> Vec<EmojiInfo> {
    vec![
        EmojiInfo {
            id: WAVE_EMOJI_ID,
            name: "wave".to_string(),
            animated: false,
            roles: Vec::new(),
        },
        EmojiInfo {
            id: PARTY_EMOJI_ID,
            name: "party".to_string(),
            animated: true,
            roles: vec![MODERATOR_ROLE_ID],
        },
    ]
}

fn populate(platform: &MockPlatform) {
    let members = [
        (BOT_ID, "modbot", 10, Permissions::all(), BOT_ROLE_ID),
        (OWNER_ID, "owner", 2, Permissions::empty(), MEMBER_ROLE_ID),
        (ADMIN_ID, "admin", 8, Permissions::ADMINISTRATOR, ADMIN_ROLE_ID),
        (MOD_ID, "moderator", 5, moderator_permissions(), MODERATOR_ROLE_ID),
        (MEMBER_ID, "member", 2, Permissions::empty(), MEMBER_ROLE_ID),
        (OTHER_MEMBER_ID, "other", 2, Permissions::empty(), MEMBER_ROLE_ID),
    ];

    for (id, name, position, permissions, role) in members {
        let mut user = mock::user(id, name);
        user.bot = id == BOT_ID;

        let mut member = mock::member(user, GUILD_ID, position, permissions);
        member.roles.push(role);
        platform.add_member(member);
    }

    platform.add_user(mock::user(STRANGER_ID, "stranger"));

    let mut state = platform.state();
    state.guild_names.insert(GUILD_ID, "Test Guild".to_string());
    state.roles.insert(GUILD_ID, guild_roles());
    state.emojis.insert(GUILD_ID, guild_emojis());
}

/// Settings document with `OWNER_ID` as the configured owner.
pub fn default_config() -> String {
    format!(r#"{{"token": "token", "def_prefix": "!", "shard_count": 1, "owner_id": {OWNER_ID}}}"#)
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

pub struct Harness {
    pub bot: Arc<Bot>,
    pub platform: Arc<MockPlatform>,
    pub test: TestContext,
    pub config_file: NamedTempFile,
    next_message_id: AtomicU64,
    // Dropped last so the bot instance is gone before the next test starts.
    _lock: MutexGuard<'static, ()>,
}

impl Harness {
    /// Connected bot with a loaded cache.
    pub async fn new() -> Self {
        let harness = Self::disconnected().await;
        harness
            .bot
            .on_connected(0, BOT_ID, &[GUILD_ID])
            .await
            .unwrap();
        harness
    }

    /// Bot that has not completed a handshake yet; its ready gate is closed.
    pub async fn disconnected() -> Self {
        Self::with_config(&default_config()).await
    }

    /// Disconnected bot running with the given settings document.
    pub async fn with_config(settings: &str) -> Self {
        let lock = test_utils::lock::exclusive().await;

        let test = TestBuilder::new()
            .with_moderation_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.clone().unwrap();

        let config_file = config_file(settings);
        let config = RuntimeConfig::load(config_file.path()).unwrap();

        let platform = Arc::new(MockPlatform::new());
        populate(&platform);

        let bot = Bot::new(config, db, platform.clone()).unwrap();

        Self {
            bot,
            platform,
            test,
            config_file,
            next_message_id: AtomicU64::new(5_000),
            _lock: lock,
        }
    }

    pub fn user(&self, id: u64) -> UserInfo {
        self.platform.state().users[&id].clone()
    }

    /// Posts `content` as `author_id` in the test channel and handles it.
    ///
    /// # Returns
    /// - Id of the posted message
    pub async fn run(&self, author_id: u64, content: &str) -> u64 {
        let id = self.next_message_id.fetch_add(1, Ordering::Relaxed);
        let message = mock::message(id, CHANNEL_ID, Some(GUILD_ID), &self.user(author_id), content);

        self.platform.add_message(message.clone());
        self.bot.handle_message(message).await;

        id
    }

    /// Direct messages the mock recorded for `user_id`.
    pub fn direct_messages(&self, user_id: u64) -> Vec<String> {
        self.platform
            .state()
            .direct_messages
            .iter()
            .filter(|(id, _)| *id == user_id)
            .map(|(_, text)| text.clone())
            .collect()
    }
}
