//! Connection lifecycle manager.
//!
//! `Bot` owns everything that outlives a single gateway event: the database connection,
//! the platform boundary, the runtime configuration, the per-guild caches, the installed
//! command modules and the cache-ready gate. The serenity event handler forwards raw gateway
//! events here; the bot reconciles guild configuration after every (re)connect, synthesizes
//! moderation events from raw events plus audit-log lookups, and dispatches commands once
//! the cache is ready.
//!
//! # Gateway Intents
//!
//! - `GUILDS` - Guild availability and joins
//! - `GUILD_MEMBERS` - Member join and leave (privileged intent)
//! - `GUILD_MODERATION` - Ban and unban events
//! - `GUILD_EMOJIS_AND_STICKERS` - Emoji role gating
//! - `GUILD_MESSAGES` / `DIRECT_MESSAGES` - Command messages, edits and deletions
//! - `MESSAGE_CONTENT` - Reading command text (privileged intent)

pub mod cache;
pub mod convert;
pub mod gateway;
pub mod handler;
pub mod lifecycle;
pub mod platform;
pub mod start;

#[cfg(test)]
pub mod mock;
#[cfg(test)]
pub(crate) mod test;

use std::sync::{
    atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering},
    Arc,
};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use sea_orm::DatabaseConnection;
use tokio::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    bot::{
        cache::{GuildCache, RecentMessages},
        lifecycle::{Lifecycle, LifecycleState, ReadyGate},
        platform::Platform,
    },
    command::{dispatch, Cooldowns},
    config::RuntimeConfig,
    data::{CustomCommandRepository, GuildConfigRepository, UserDataRepository},
    error::AppError,
    model::{
        event::{BotEvent, Dispatched, ModerationEntry},
        guild::GuildSettings,
        platform::{AuditAction, ChannelMessage, Owners, UserInfo},
    },
    module::{self, Registry},
};

/// How far back an audit-log entry may lie to be attributed to a gateway event.
const AUDIT_WINDOW_MINUTES: i64 = 15;
const AUDIT_FETCH_LIMIT: u8 = 25;
const RECENT_MESSAGE_CAPACITY: usize = 1000;
/// Game shown while no activity text is configured.
pub const DEFAULT_ACTIVITY: &str = env!("CARGO_PKG_VERSION");

static INSTANCE_ALIVE: AtomicBool = AtomicBool::new(false);

/// Marks the single live `Bot` of the process; released on drop.
struct InstanceGuard;

impl InstanceGuard {
    fn acquire() -> Result<Self, AppError> {
        INSTANCE_ALIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| InstanceGuard)
            .map_err(|_| AppError::InstanceAlreadyExists)
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        INSTANCE_ALIVE.store(false, Ordering::SeqCst);
    }
}

/// Process exit code requested when the client stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Quit = 0,
    Crash = 1,
    Restart = 65,
}

impl ExitCode {
    /// Maps a raw code back; unknown codes are treated as a normal shutdown.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ExitCode::Quit,
            1 => ExitCode::Crash,
            65 => ExitCode::Restart,
            other => {
                tracing::warn!("Unknown exit code {}, treating it as a normal shutdown", other);
                ExitCode::Quit
            }
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

pub struct Bot {
    _instance: InstanceGuard,
    pub db: DatabaseConnection,
    pub platform: Arc<dyn Platform>,
    config: Mutex<RuntimeConfig>,
    default_prefix: String,
    case_insensitive: bool,
    strip_after_prefix: bool,
    owners: RwLock<Vec<u64>>,
    bot_user_id: AtomicU64,
    pub cache: GuildCache,
    pub recent: RecentMessages,
    gate: ReadyGate,
    lifecycle: Lifecycle,
    modules: RwLock<Registry>,
    cooldowns: Cooldowns,
    exit_code: AtomicI32,
    started_at: DateTime<Utc>,
}

impl Bot {
    /// Creates the lifecycle manager and installs every known module.
    ///
    /// # Returns
    /// - `Ok(Arc<Bot>)` - The process-wide bot instance
    /// - `Err(AppError::InstanceAlreadyExists)` - Another instance is still alive
    /// - `Err(AppError::ModuleErr)` - A module failed to install
    pub fn new(
        config: RuntimeConfig,
        db: DatabaseConnection,
        platform: Arc<dyn Platform>,
    ) -> Result<Arc<Self>, AppError> {
        let instance = InstanceGuard::acquire()?;
        let settings = config.settings().clone();

        let mut registry = Registry::new(module::catalog());
        for name in registry.available() {
            registry.load(name)?;
        }

        Ok(Arc::new(Self {
            _instance: instance,
            db,
            platform,
            default_prefix: settings.def_prefix.trim().to_string(),
            case_insensitive: settings.case_insensitive.unwrap_or(false),
            strip_after_prefix: settings.strip_after_prefix.unwrap_or(false),
            owners: RwLock::new(settings.configured_owners().unwrap_or_default()),
            config: Mutex::new(config),
            bot_user_id: AtomicU64::new(0),
            cache: GuildCache::new(),
            recent: RecentMessages::new(RECENT_MESSAGE_CAPACITY),
            gate: ReadyGate::new(settings.shard_count),
            lifecycle: Lifecycle::new(),
            modules: RwLock::new(registry),
            cooldowns: Cooldowns::new(),
            exit_code: AtomicI32::new(ExitCode::Crash.code()),
            started_at: Utc::now(),
        }))
    }

    pub fn user_id(&self) -> u64 {
        self.bot_user_id.load(Ordering::Relaxed)
    }

    pub fn default_prefix(&self) -> &str {
        &self.default_prefix
    }

    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn strip_after_prefix(&self) -> bool {
        self.strip_after_prefix
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn is_ready(&self) -> bool {
        self.gate.is_open()
    }

    pub fn cooldowns(&self) -> &Cooldowns {
        &self.cooldowns
    }

    pub async fn config(&self) -> MutexGuard<'_, RuntimeConfig> {
        self.config.lock().await
    }

    pub async fn modules(&self) -> RwLockReadGuard<'_, Registry> {
        self.modules.read().await
    }

    pub async fn modules_mut(&self) -> RwLockWriteGuard<'_, Registry> {
        self.modules.write().await
    }

    pub async fn owners(&self) -> Vec<u64> {
        self.owners.read().await.clone()
    }

    pub async fn is_owner(&self, user_id: u64) -> bool {
        self.owners.read().await.contains(&user_id)
    }

    /// Shows the configured activity text, or [`DEFAULT_ACTIVITY`] when none is set.
    pub async fn apply_activity(&self) {
        let configured = self.config().await.settings().activity_text.clone();
        let text = configured
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or(DEFAULT_ACTIVITY);
        self.platform.set_activity(Some(text)).await;
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from_code(self.exit_code.load(Ordering::SeqCst))
    }

    /// Marks the connection as starting; called right before the shards are started.
    pub fn start(&self) -> Result<(), AppError> {
        self.lifecycle.transition(LifecycleState::Connecting)?;
        Ok(())
    }

    /// Handles a completed gateway handshake of `shard_id`.
    ///
    /// Closes the ready gate for the shard, resolves owners, reconciles and reloads the
    /// configuration of `guild_ids`, then marks the shard loaded. The gate opens once no shard
    /// has a load outstanding, so commands wait until every shard's guilds are cached.
    pub async fn on_connected(
        &self,
        shard_id: u32,
        bot_user_id: u64,
        guild_ids: &[u64],
    ) -> Result<(), AppError> {
        self.bot_user_id.store(bot_user_id, Ordering::Relaxed);
        self.lifecycle.enter_cache_loading()?;
        let epoch = self.gate.close(shard_id);

        self.resolve_owners().await;
        self.reconcile_guilds(guild_ids).await?;
        self.load_cache(guild_ids).await?;

        if self.gate.open(shard_id, epoch) {
            self.lifecycle.transition(LifecycleState::Ready)?;
            tracing::info!(
                "Cache ready for {} guild(s), processing commands",
                self.cache.guild_count()
            );
        } else {
            tracing::debug!(
                "Shard {} loaded {} guild(s), still waiting on shard(s) {:?}",
                shard_id,
                guild_ids.len(),
                self.gate.pending_shards()
            );
        }

        Ok(())
    }

    /// Handles a shard starting to (re)connect.
    pub fn on_connecting(&self) {
        if self.lifecycle.state() == LifecycleState::Disconnected {
            if let Err(e) = self.lifecycle.transition(LifecycleState::Connecting) {
                tracing::debug!("Ignoring connecting notification: {:?}", e);
            }
        }
    }

    /// Handles `shard_id` losing its connection; commands wait until it is loaded again.
    pub fn on_connection_lost(&self, shard_id: u32) {
        self.gate.close(shard_id);
        if let Err(e) = self.lifecycle.transition(LifecycleState::Disconnected) {
            tracing::debug!("Ignoring connection loss notification: {:?}", e);
        }
    }

    async fn resolve_owners(&self) {
        if let Some(owners) = self.config.lock().await.settings().configured_owners() {
            *self.owners.write().await = owners;
            return;
        }

        match self.platform.application_info().await {
            Ok(info) => {
                let owners = match info.owners {
                    Owners::Single(id) => vec![id],
                    Owners::Team(ids) => ids,
                };
                tracing::info!("Resolved {} owner(s) from application info", owners.len());
                *self.owners.write().await = owners;
            }
            Err(e) => tracing::error!("Failed to fetch application info for owners: {:?}", e),
        }
    }

    /// Inserts a default configuration row for every joined guild that has none.
    async fn reconcile_guilds(&self, guild_ids: &[u64]) -> Result<(), AppError> {
        let repo = GuildConfigRepository::new(&self.db);

        let missing = repo.missing_guild_ids(guild_ids).await?;
        if missing.is_empty() {
            return Ok(());
        }

        tracing::warn!(
            "Creating missing configuration for {} guild(s): {:?}",
            missing.len(),
            missing
        );
        repo.insert_defaults(&missing, &self.default_prefix).await?;

        Ok(())
    }

    async fn load_cache(&self, guild_ids: &[u64]) -> Result<(), AppError> {
        let configs = GuildConfigRepository::new(&self.db)
            .get_many(guild_ids)
            .await?;
        let commands = CustomCommandRepository::new(&self.db)
            .get_many(guild_ids)
            .await?;

        tracing::debug!(
            "Loaded {} guild configuration(s) and {} custom command(s)",
            configs.len(),
            commands.len()
        );
        self.cache.replace(guild_ids, configs, commands);

        Ok(())
    }

    /// Ensures a newly joined guild has a configuration row and a cache entry.
    pub async fn on_guild_join(&self, guild_id: u64) -> Result<GuildSettings, AppError> {
        let repo = GuildConfigRepository::new(&self.db);

        let settings = match repo.find(guild_id).await? {
            Some(settings) => settings,
            None => {
                tracing::info!("Joined guild {}, creating its configuration", guild_id);
                repo.create_default(guild_id, &self.default_prefix).await?
            }
        };

        self.cache.insert_guild(settings.clone());

        Ok(settings)
    }

    /// Prefixes accepted for a message, longest first.
    ///
    /// Mentioning the bot always works; guild messages also accept the guild's prefix, or
    /// the default prefix when the guild has no cached configuration.
    pub fn prefixes_for(&self, guild_id: Option<u64>) -> Vec<String> {
        let user_id = self.user_id();
        let mut prefixes = vec![format!("<@{}> ", user_id), format!("<@!{}> ", user_id)];

        if let Some(guild_id) = guild_id {
            prefixes.push(
                self.cache
                    .prefix(guild_id)
                    .unwrap_or_else(|| self.default_prefix.clone()),
            );
        }

        prefixes.sort_by(|a, b| b.len().cmp(&a.len()));
        prefixes
    }

    /// Entry point for new messages. Waits for the ready gate before dispatching.
    pub async fn handle_message(&self, message: ChannelMessage) {
        if message.author.bot {
            return;
        }

        self.recent.remember(message.clone()).await;
        self.gate.wait().await;

        dispatch::dispatch(self, &message).await;
    }

    /// Handles an edited message.
    ///
    /// A `MessageEdit` is emitted when the previous version is known and its text or
    /// attachments changed. The message is dispatched again as a command unless its pin
    /// state, attachments or embeds changed.
    pub async fn on_message_edit(&self, after: ChannelMessage) -> Option<Dispatched> {
        if after.author.bot {
            return None;
        }

        let before = self.recent.get(after.id);
        self.recent.remember(after.clone()).await;

        let redispatch = before.as_ref().map_or(true, |before| {
            before.pinned == after.pinned
                && before.attachments == after.attachments
                && before.embeds == after.embeds
        });

        let dispatched = match before {
            Some(before)
                if before.content != after.content || before.attachments != after.attachments =>
            {
                self.emit_logged(BotEvent::MessageEdit {
                    before,
                    after: after.clone(),
                })
                .await
            }
            _ => None,
        };

        if redispatch {
            self.gate.wait().await;
            dispatch::dispatch(self, &after).await;
        }

        dispatched
    }

    /// Handles a deleted message; only messages seen before produce an event.
    pub async fn on_message_delete(&self, message_id: u64) -> Option<Dispatched> {
        let message = self.recent.forget(message_id).await?;
        if message.author.bot {
            return None;
        }

        self.emit_logged(BotEvent::MessageDelete { message }).await
    }

    pub async fn on_member_join(&self, guild_id: u64, user: UserInfo) -> Option<Dispatched> {
        self.emit_logged(BotEvent::MemberJoin { guild_id, user }).await
    }

    /// Classifies a member removal as kick or leave.
    ///
    /// Removals caused by a ban are left to the ban event. The classification relies on
    /// the audit log having caught up with the gateway, so it is a best-effort heuristic.
    pub async fn on_member_remove(&self, guild_id: u64, user: UserInfo) -> Option<Dispatched> {
        match self.platform.is_banned(guild_id, user.id).await {
            Ok(true) => return None,
            Ok(false) => {}
            Err(e) => tracing::warn!(
                "Failed to check ban of user {} in guild {}: {:?}",
                user.id,
                guild_id,
                e
            ),
        }

        let event = match self.find_audit_entry(guild_id, AuditAction::Kick, user.id).await {
            Some(entry) => BotEvent::MemberKick {
                guild_id,
                user,
                entry,
            },
            None => BotEvent::MemberLeft { guild_id, user },
        };

        self.emit_logged(event).await
    }

    pub async fn on_ban(&self, guild_id: u64, user: UserInfo) -> Option<Dispatched> {
        let entry = self.find_audit_entry(guild_id, AuditAction::Ban, user.id).await;
        self.emit_logged(BotEvent::MemberBan {
            guild_id,
            user,
            entry,
        })
        .await
    }

    pub async fn on_unban(&self, guild_id: u64, user: UserInfo) -> Option<Dispatched> {
        let entry = self
            .find_audit_entry(guild_id, AuditAction::Unban, user.id)
            .await;
        self.emit_logged(BotEvent::MemberUnban {
            guild_id,
            user,
            entry,
        })
        .await
    }

    /// Most recent audit-log entry of `action` against `target_id` within the last
    /// 15 minutes. Lookup failures are logged and treated as "not found".
    pub async fn find_audit_entry(
        &self,
        guild_id: u64,
        action: AuditAction,
        target_id: u64,
    ) -> Option<ModerationEntry> {
        let entries = match self
            .platform
            .audit_log(guild_id, action, AUDIT_FETCH_LIMIT)
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    "Failed to read {:?} audit log of guild {}: {:?}",
                    action,
                    guild_id,
                    e
                );
                return None;
            }
        };

        let since = Utc::now() - ChronoDuration::minutes(AUDIT_WINDOW_MINUTES);

        entries
            .into_iter()
            .filter(|entry| {
                entry.action == action
                    && entry.target_id == Some(target_id)
                    && entry.created_at >= since
            })
            .max_by_key(|entry| entry.created_at)
            .map(|entry| ModerationEntry {
                moderator_id: entry.moderator_id,
                reason: entry.reason,
            })
    }

    /// Commits the event's counter change, then notifies listeners.
    ///
    /// Listeners are skipped when the counter change was a no-op (unwarn without warnings).
    pub async fn emit(&self, event: BotEvent) -> Result<Dispatched, AppError> {
        let (record, changed) = match event.counter_change() {
            Some((guild_id, user_id, change)) => {
                let (record, changed) = UserDataRepository::new(&self.db)
                    .apply(guild_id, user_id, change)
                    .await?;
                (Some(record), changed)
            }
            None => (None, true),
        };

        let dispatched = Dispatched {
            event,
            record,
            changed,
        };

        if changed {
            let listeners = self.modules.read().await.listeners();
            for listener in listeners {
                listener.on_event(self, &dispatched).await;
            }
        }

        Ok(dispatched)
    }

    async fn emit_logged(&self, event: BotEvent) -> Option<Dispatched> {
        match self.emit(event).await {
            Ok(dispatched) => Some(dispatched),
            Err(e) => {
                tracing::error!("Failed to emit event: {:?}", e);
                None
            }
        }
    }

    /// Requests the client to stop with `code`.
    pub async fn shutdown(&self, code: ExitCode) {
        self.exit_code.store(code.code(), Ordering::SeqCst);

        if let Err(e) = self.lifecycle.transition(LifecycleState::ShuttingDown) {
            tracing::warn!("Shutting down outside of the ready state: {:?}", e);
        }

        tracing::info!("Shutting down with exit code {}", code.code());
        self.platform.shutdown().await;
    }
}
