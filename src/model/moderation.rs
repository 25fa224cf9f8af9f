//! Domain models for per-user moderation counters

/// Moderation counters of one user within one guild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModerationRecord {
    pub guild_id: u64,
    pub user_id: u64,
    pub current_warns: i32,
    pub total_warns: i32,
    pub total_kicks: i32,
    pub total_bans: i32,
}

impl ModerationRecord {
    /// Converts an entity model to the moderation record domain model
    pub fn from_entity(entity: entity::user_data::Model) -> Self {
        Self {
            guild_id: entity.guild_id as u64,
            user_id: entity.user_id as u64,
            current_warns: entity.current_warns,
            total_warns: entity.total_warns,
            total_kicks: entity.total_kicks,
            total_bans: entity.total_bans,
        }
    }

    /// Record with every counter at zero, used before the first moderation action
    pub fn empty(guild_id: u64, user_id: u64) -> Self {
        Self {
            guild_id,
            user_id,
            ..Default::default()
        }
    }

    /// Applies a counter change in place.
    ///
    /// # Returns
    /// - `true` - The counters changed
    /// - `false` - Nothing to change (unwarn with no current warnings)
    pub fn apply(&mut self, change: CounterChange) -> bool {
        match change {
            CounterChange::Warn => {
                self.current_warns += 1;
                self.total_warns += 1;
            }
            CounterChange::Unwarn => {
                if self.current_warns <= 0 {
                    return false;
                }
                self.current_warns -= 1;
            }
            CounterChange::Kick => self.total_kicks += 1,
            CounterChange::Ban => self.total_bans += 1,
        }

        true
    }
}

/// Counter mutation caused by a moderation event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterChange {
    Warn,
    Unwarn,
    Kick,
    Ban,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warn_then_unwarn_restores_current_count() {
        let mut record = ModerationRecord::empty(1, 2);

        assert!(record.apply(CounterChange::Warn));
        assert!(record.apply(CounterChange::Unwarn));

        assert_eq!(record.current_warns, 0);
        assert_eq!(record.total_warns, 1);
    }

    #[test]
    fn unwarn_without_warnings_is_noop() {
        let mut record = ModerationRecord::empty(1, 2);

        assert!(!record.apply(CounterChange::Unwarn));
        assert_eq!(record, ModerationRecord::empty(1, 2));
    }

    #[test]
    fn kick_and_ban_only_touch_their_totals() {
        let mut record = ModerationRecord::empty(1, 2);

        record.apply(CounterChange::Kick);
        record.apply(CounterChange::Ban);

        assert_eq!(record.total_kicks, 1);
        assert_eq!(record.total_bans, 1);
        assert_eq!(record.current_warns, 0);
        assert_eq!(record.total_warns, 0);
    }
}
