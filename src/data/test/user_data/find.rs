use super::*;

/// Tests reading an existing moderation record.
///
/// Expected: Ok(Some) with stored counters
#[tokio::test]
async fn finds_existing_record() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_moderation_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild_config(db).await?;
    factory::user_data::UserDataFactory::new(db, guild.guild_id)
        .user_id(42)
        .current_warns(2)
        .total_warns(5)
        .total_bans(1)
        .build()
        .await?;

    let repo = UserDataRepository::new(db);
    let record = repo.find(guild.guild_id as u64, 42).await?.unwrap();

    assert_eq!(record.current_warns, 2);
    assert_eq!(record.total_warns, 5);
    assert_eq!(record.total_kicks, 0);
    assert_eq!(record.total_bans, 1);

    Ok(())
}
