use std::time::Duration;

use dashmap::{mapref::entry::Entry, DashMap};
use serenity::all::Permissions;
use tokio::time::Instant;

use crate::model::platform::ChannelMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    User,
    /// Shared by a whole guild; private channels count as their own guild.
    Guild,
}

/// One invocation per `per` and bucket.
#[derive(Debug, Clone, Copy)]
pub struct Cooldown {
    pub per: Duration,
    pub bucket: Bucket,
    /// Guild members holding these permissions are never throttled.
    pub bypass: Option<Permissions>,
}

impl Cooldown {
    pub fn user(secs: u64) -> Self {
        Self {
            per: Duration::from_secs(secs),
            bucket: Bucket::User,
            bypass: None,
        }
    }

    pub fn guild(secs: u64) -> Self {
        Self {
            per: Duration::from_secs(secs),
            bucket: Bucket::Guild,
            bypass: None,
        }
    }

    pub fn bypassed_by(mut self, permissions: Permissions) -> Self {
        self.bypass = Some(permissions);
        self
    }
}

#[derive(Default)]
pub struct Cooldowns {
    last_used: DashMap<(&'static str, u64), Instant>,
}

impl Cooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an invocation, or returns how long the bucket is still cooling down.
    pub fn hit(
        &self,
        command: &'static str,
        cooldown: &Cooldown,
        message: &ChannelMessage,
    ) -> Result<(), Duration> {
        let key = match cooldown.bucket {
            Bucket::User => message.author.id,
            Bucket::Guild => message.guild_id.unwrap_or(message.channel_id),
        };
        let now = Instant::now();

        match self.last_used.entry((command, key)) {
            Entry::Occupied(mut entry) => {
                let elapsed = now.duration_since(*entry.get());
                if elapsed < cooldown.per {
                    return Err(cooldown.per - elapsed);
                }
                entry.insert(now);
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::mock::{message, user};

    #[tokio::test(start_paused = true)]
    async fn blocks_until_the_period_passed() {
        let cooldowns = Cooldowns::new();
        let cooldown = Cooldown::user(5);
        let msg = message(1, 10, Some(20), &user(7, "someone"), "!coin");

        assert!(cooldowns.hit("coin", &cooldown, &msg).is_ok());

        tokio::time::advance(Duration::from_secs(2)).await;
        let remaining = cooldowns.hit("coin", &cooldown, &msg).unwrap_err();
        assert_eq!(remaining, Duration::from_secs(3));

        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(cooldowns.hit("coin", &cooldown, &msg).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn guild_bucket_is_shared_between_users() {
        let cooldowns = Cooldowns::new();
        let cooldown = Cooldown::guild(5);
        let first = message(1, 10, Some(20), &user(7, "a"), "!ping");
        let second = message(2, 10, Some(20), &user(8, "b"), "!ping");
        let elsewhere = message(3, 11, Some(21), &user(8, "b"), "!ping");

        assert!(cooldowns.hit("ping", &cooldown, &first).is_ok());
        assert!(cooldowns.hit("ping", &cooldown, &second).is_err());
        assert!(cooldowns.hit("ping", &cooldown, &elsewhere).is_ok());
    }
}
