//! Moderation record factory.

use crate::factory::helpers::next_id;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating per-user moderation counter rows.
///
/// The referenced guild configuration row must already exist.
pub struct UserDataFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: i64,
    user_id: i64,
    current_warns: i32,
    total_warns: i32,
    total_kicks: i32,
    total_bans: i32,
}

impl<'a> UserDataFactory<'a> {
    /// Creates a new UserDataFactory with every counter at zero and a fresh user id.
    ///
    /// # Arguments
    /// - `db` - Database connection for inserting the entity
    /// - `guild_id` - Guild the record belongs to
    pub fn new(db: &'a DatabaseConnection, guild_id: i64) -> Self {
        Self {
            db,
            guild_id,
            user_id: next_id() as i64,
            current_warns: 0,
            total_warns: 0,
            total_kicks: 0,
            total_bans: 0,
        }
    }

    pub fn user_id(mut self, user_id: i64) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn current_warns(mut self, current_warns: i32) -> Self {
        self.current_warns = current_warns;
        self
    }

    pub fn total_warns(mut self, total_warns: i32) -> Self {
        self.total_warns = total_warns;
        self
    }

    pub fn total_kicks(mut self, total_kicks: i32) -> Self {
        self.total_kicks = total_kicks;
        self
    }

    pub fn total_bans(mut self, total_bans: i32) -> Self {
        self.total_bans = total_bans;
        self
    }

    /// Builds and inserts the moderation record.
    ///
    /// # Returns
    /// - `Ok(entity::user_data::Model)` - Created record
    /// - `Err(DbErr)` - Database error during insert
    pub async fn build(self) -> Result<entity::user_data::Model, DbErr> {
        entity::user_data::ActiveModel {
            guild_id: ActiveValue::Set(self.guild_id),
            user_id: ActiveValue::Set(self.user_id),
            current_warns: ActiveValue::Set(self.current_warns),
            total_warns: ActiveValue::Set(self.total_warns),
            total_kicks: ActiveValue::Set(self.total_kicks),
            total_bans: ActiveValue::Set(self.total_bans),
        }
        .insert(self.db)
        .await
    }
}

/// Creates a moderation record with zeroed counters for a fresh user.
pub async fn create_user_data(
    db: &DatabaseConnection,
    guild_id: i64,
) -> Result<entity::user_data::Model, DbErr> {
    UserDataFactory::new(db, guild_id).build().await
}
