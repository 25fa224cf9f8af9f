//! Shared helper utilities for factory methods.

use sea_orm::{DatabaseConnection, DbErr};

/// Counter for generating unique IDs in tests.
///
/// Starts well above zero so generated ids look like platform snowflakes and never collide
/// with the small literal ids tests use directly.
static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(100_000);

/// Gets the next unique counter value for test data.
///
/// # Returns
/// - `u64` - Next unique counter value
pub fn next_id() -> u64 {
    COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
}

/// Creates a guild configuration row together with a moderation record inside it.
///
/// # Arguments
/// - `db` - Database connection
///
/// # Returns
/// - `Ok((guild, record))` - Tuple of the created entities
/// - `Err(DbErr)` - Database error during creation
pub async fn create_user_data_with_guild(
    db: &DatabaseConnection,
) -> Result<(entity::guild_config::Model, entity::user_data::Model), DbErr> {
    let guild = crate::factory::guild_config::create_guild_config(db).await?;
    let record = crate::factory::user_data::create_user_data(db, guild.guild_id).await?;

    Ok((guild, record))
}
