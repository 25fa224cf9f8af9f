use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr, EntityTrait, TransactionTrait,
};

use crate::model::moderation::{CounterChange, ModerationRecord};

pub struct UserDataRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserDataRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds the moderation record of a user in a guild
    ///
    /// # Returns
    /// - `Ok(Some(ModerationRecord))`: The user has been moderated in this guild before
    /// - `Ok(None)`: No record yet
    /// - `Err(DbErr)`: Database error during query
    pub async fn find(&self, guild_id: u64, user_id: u64) -> Result<Option<ModerationRecord>, DbErr> {
        let model = entity::prelude::UserData::find_by_id((guild_id as i64, user_id as i64))
            .one(self.db)
            .await?;

        Ok(model.map(ModerationRecord::from_entity))
    }

    /// Applies a counter change inside a single transaction.
    ///
    /// Creates the record with zeroed counters when absent. An unwarn on a record without
    /// current warnings changes nothing, and no row is created for it.
    ///
    /// # Arguments
    /// - `guild_id`: Guild the action happened in; its configuration row must exist
    /// - `user_id`: The moderated user
    /// - `change`: Counter mutation to apply
    ///
    /// # Returns
    /// - `Ok((record, true))`: Counters after the change
    /// - `Ok((record, false))`: Nothing changed; `record` is the current state
    /// - `Err(DbErr)`: Database error; the transaction is rolled back
    pub async fn apply(
        &self,
        guild_id: u64,
        user_id: u64,
        change: CounterChange,
    ) -> Result<(ModerationRecord, bool), DbErr> {
        let txn = self.db.begin().await?;

        let existing = entity::prelude::UserData::find_by_id((guild_id as i64, user_id as i64))
            .one(&txn)
            .await?;

        let mut record = existing
            .clone()
            .map(ModerationRecord::from_entity)
            .unwrap_or_else(|| ModerationRecord::empty(guild_id, user_id));

        if !record.apply(change) {
            txn.commit().await?;
            return Ok((record, false));
        }

        let active = entity::user_data::ActiveModel {
            guild_id: ActiveValue::Set(guild_id as i64),
            user_id: ActiveValue::Set(user_id as i64),
            current_warns: ActiveValue::Set(record.current_warns),
            total_warns: ActiveValue::Set(record.total_warns),
            total_kicks: ActiveValue::Set(record.total_kicks),
            total_bans: ActiveValue::Set(record.total_bans),
        };

        let model = match existing {
            Some(_) => {
                let mut active = active;
                active.guild_id = ActiveValue::Unchanged(guild_id as i64);
                active.user_id = ActiveValue::Unchanged(user_id as i64);
                active.update(&txn).await?
            }
            None => active.insert(&txn).await?,
        };

        txn.commit().await?;

        Ok((ModerationRecord::from_entity(model), true))
    }
}
