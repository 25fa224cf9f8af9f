//! In-memory caches rebuilt from the database after every (re)connect.

use std::collections::{HashMap, VecDeque};

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::model::{
    custom_command::CustomCommand, guild::GuildSettings, platform::ChannelMessage,
};

/// Guild-keyed snapshots of configuration rows and custom commands.
#[derive(Default)]
pub struct GuildCache {
    configs: DashMap<u64, GuildSettings>,
    custom_commands: DashMap<u64, HashMap<String, CustomCommand>>,
}

impl GuildCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn guild(&self, guild_id: u64) -> Option<GuildSettings> {
        self.configs.get(&guild_id).map(|entry| entry.clone())
    }

    pub fn prefix(&self, guild_id: u64) -> Option<String> {
        self.configs
            .get(&guild_id)
            .map(|entry| entry.prefix.clone())
    }

    pub fn log_channel(&self, guild_id: u64) -> Option<u64> {
        self.configs
            .get(&guild_id)
            .and_then(|entry| entry.log_channel)
    }

    pub fn guild_count(&self) -> usize {
        self.configs.len()
    }

    pub fn insert_guild(&self, settings: GuildSettings) {
        self.configs.insert(settings.guild_id, settings);
    }

    /// Replaces the cached state of `guild_ids` with freshly loaded rows.
    ///
    /// Entries for the listed guilds that have no row or command anymore are dropped.
    pub fn replace(
        &self,
        guild_ids: &[u64],
        configs: Vec<GuildSettings>,
        commands: Vec<CustomCommand>,
    ) {
        for guild_id in guild_ids {
            self.configs.remove(guild_id);
            self.custom_commands.remove(guild_id);
        }

        for settings in configs {
            self.configs.insert(settings.guild_id, settings);
        }

        for command in commands {
            self.custom_commands
                .entry(command.guild_id)
                .or_default()
                .insert(command.command.clone(), command);
        }
    }

    pub fn custom_command(&self, guild_id: u64, name: &str) -> Option<CustomCommand> {
        self.custom_commands
            .get(&guild_id)
            .and_then(|commands| commands.get(name).cloned())
    }

    pub fn custom_command_count(&self, guild_id: u64) -> usize {
        self.custom_commands
            .get(&guild_id)
            .map_or(0, |commands| commands.len())
    }
}

/// Bounded store of recently seen messages.
///
/// Edits and deletions arrive without the previous content; this keeps the last few
/// messages around so the logging module can show what changed.
pub struct RecentMessages {
    capacity: usize,
    messages: DashMap<u64, ChannelMessage>,
    order: Mutex<VecDeque<u64>>,
}

impl RecentMessages {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            messages: DashMap::new(),
            order: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Stores or replaces a message, evicting the oldest entries beyond capacity.
    pub async fn remember(&self, message: ChannelMessage) {
        let mut order = self.order.lock().await;

        if self.messages.insert(message.id, message.clone()).is_none() {
            order.push_back(message.id);
        }

        while order.len() > self.capacity {
            if let Some(oldest) = order.pop_front() {
                self.messages.remove(&oldest);
            }
        }
    }

    pub fn get(&self, message_id: u64) -> Option<ChannelMessage> {
        self.messages.get(&message_id).map(|entry| entry.clone())
    }

    pub async fn forget(&self, message_id: u64) -> Option<ChannelMessage> {
        let mut order = self.order.lock().await;
        order.retain(|id| *id != message_id);

        self.messages.remove(&message_id).map(|(_, message)| message)
    }
}
