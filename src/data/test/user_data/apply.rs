use super::*;

/// Tests that the first warn creates the record.
///
/// Expected: Ok with current and total warns at 1
#[tokio::test]
async fn creates_record_on_first_warn() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_moderation_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild_config(db).await?;

    let repo = UserDataRepository::new(db);
    let (record, changed) = repo
        .apply(guild.guild_id as u64, 42, CounterChange::Warn)
        .await?;

    assert!(changed);
    assert_eq!(record.current_warns, 1);
    assert_eq!(record.total_warns, 1);
    assert_eq!(entity::prelude::UserData::find().count(db).await?, 1);

    Ok(())
}

/// Tests warn followed by unwarn.
///
/// Verifies current warnings return to their previous value while the lifetime count keeps
/// the warn.
///
/// Expected: Ok with current_warns restored and total_warns incremented by one
#[tokio::test]
async fn warn_then_unwarn_restores_current_warns() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_moderation_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (guild, existing) = factory::helpers::create_user_data_with_guild(db).await?;
    let guild_id = guild.guild_id as u64;
    let user_id = existing.user_id as u64;

    let repo = UserDataRepository::new(db);
    repo.apply(guild_id, user_id, CounterChange::Warn).await?;
    let (record, changed) = repo.apply(guild_id, user_id, CounterChange::Unwarn).await?;

    assert!(changed);
    assert_eq!(record.current_warns, existing.current_warns);
    assert_eq!(record.total_warns, existing.total_warns + 1);

    Ok(())
}

/// Tests unwarn on a user without warnings.
///
/// Expected: Ok with unchanged counters and no row created
#[tokio::test]
async fn unwarn_without_warnings_is_noop() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_moderation_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild_config(db).await?;

    let repo = UserDataRepository::new(db);
    let (record, changed) = repo
        .apply(guild.guild_id as u64, 42, CounterChange::Unwarn)
        .await?;

    assert!(!changed);
    assert_eq!(record.current_warns, 0);
    assert_eq!(entity::prelude::UserData::find().count(db).await?, 0);

    Ok(())
}

/// Tests kick and ban counters on an existing record.
///
/// Expected: Ok with only the lifetime kick and ban totals incremented
#[tokio::test]
async fn increments_kick_and_ban_totals() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_moderation_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild_config(db).await?;
    factory::user_data::UserDataFactory::new(db, guild.guild_id)
        .user_id(7)
        .current_warns(3)
        .total_warns(3)
        .total_kicks(1)
        .build()
        .await?;

    let repo = UserDataRepository::new(db);
    repo.apply(guild.guild_id as u64, 7, CounterChange::Kick)
        .await?;
    let (record, _) = repo
        .apply(guild.guild_id as u64, 7, CounterChange::Ban)
        .await?;

    assert_eq!(record.total_kicks, 2);
    assert_eq!(record.total_bans, 1);
    assert_eq!(record.current_warns, 3);
    assert_eq!(record.total_warns, 3);

    Ok(())
}

/// Tests that records require an existing guild row.
///
/// Expected: Err from the foreign key and no row left behind
#[tokio::test]
async fn rejects_record_for_unknown_guild() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_moderation_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = UserDataRepository::new(db);

    assert!(repo.apply(999, 1, CounterChange::Warn).await.is_err());
    assert_eq!(entity::prelude::UserData::find().count(db).await?, 0);

    Ok(())
}
