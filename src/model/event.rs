//! Events the lifecycle manager delivers to module listeners.
//!
//! Moderation events are synthesized from primitive gateway events plus a best-effort
//! audit-log lookup; the attached entry is absent when no matching record was found.

use crate::model::{
    moderation::{CounterChange, ModerationRecord},
    platform::{ChannelMessage, UserInfo},
};

/// Responsible moderator and reason of a moderation action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModerationEntry {
    pub moderator_id: Option<u64>,
    pub reason: Option<String>,
}

impl ModerationEntry {
    pub fn new(moderator_id: u64, reason: Option<String>) -> Self {
        Self {
            moderator_id: Some(moderator_id),
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotEvent {
    MemberJoin {
        guild_id: u64,
        user: UserInfo,
    },
    MemberLeft {
        guild_id: u64,
        user: UserInfo,
    },
    MemberWarn {
        guild_id: u64,
        user: UserInfo,
        entry: ModerationEntry,
    },
    MemberUnwarn {
        guild_id: u64,
        user: UserInfo,
        entry: ModerationEntry,
    },
    MemberKick {
        guild_id: u64,
        user: UserInfo,
        entry: ModerationEntry,
    },
    MemberBan {
        guild_id: u64,
        user: UserInfo,
        entry: Option<ModerationEntry>,
    },
    MemberUnban {
        guild_id: u64,
        user: UserInfo,
        entry: Option<ModerationEntry>,
    },
    MessageEdit {
        before: ChannelMessage,
        after: ChannelMessage,
    },
    MessageDelete {
        message: ChannelMessage,
    },
}

impl BotEvent {
    pub fn guild_id(&self) -> Option<u64> {
        match self {
            BotEvent::MemberJoin { guild_id, .. }
            | BotEvent::MemberLeft { guild_id, .. }
            | BotEvent::MemberWarn { guild_id, .. }
            | BotEvent::MemberUnwarn { guild_id, .. }
            | BotEvent::MemberKick { guild_id, .. }
            | BotEvent::MemberBan { guild_id, .. }
            | BotEvent::MemberUnban { guild_id, .. } => Some(*guild_id),
            BotEvent::MessageEdit { after, .. } => after.guild_id,
            BotEvent::MessageDelete { message } => message.guild_id,
        }
    }

    /// Counter update that must be committed before listeners see this event.
    pub fn counter_change(&self) -> Option<(u64, u64, CounterChange)> {
        match self {
            BotEvent::MemberWarn { guild_id, user, .. } => {
                Some((*guild_id, user.id, CounterChange::Warn))
            }
            BotEvent::MemberUnwarn { guild_id, user, .. } => {
                Some((*guild_id, user.id, CounterChange::Unwarn))
            }
            BotEvent::MemberKick { guild_id, user, .. } => {
                Some((*guild_id, user.id, CounterChange::Kick))
            }
            BotEvent::MemberBan { guild_id, user, .. } => {
                Some((*guild_id, user.id, CounterChange::Ban))
            }
            _ => None,
        }
    }
}

/// An event together with the counters it produced.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub event: BotEvent,
    /// Counters after the update, or the unchanged record for a no-op unwarn.
    pub record: Option<ModerationRecord>,
    /// `false` when the counter change was a no-op; listeners are not notified then.
    pub changed: bool,
}
