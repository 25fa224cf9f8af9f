use super::*;

/// Tests diffing joined guilds against stored rows.
///
/// Expected: Ok with only the ids lacking a row
#[tokio::test]
async fn returns_guilds_without_rows() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::guild_config::GuildConfigFactory::new(db)
        .guild_id(1)
        .build()
        .await?;
    factory::guild_config::GuildConfigFactory::new(db)
        .guild_id(3)
        .build()
        .await?;

    let repo = GuildConfigRepository::new(db);
    let missing = repo.missing_guild_ids(&[1, 2, 3, 4]).await?;

    assert_eq!(missing, vec![2, 4]);

    Ok(())
}

/// Tests reconciliation across more guilds than fit in one page.
///
/// Inserts defaults for all missing guilds and verifies a second diff is empty.
///
/// Expected: Ok with every guild present afterwards
#[tokio::test]
async fn reconciles_across_pages() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let joined: Vec<u64> = (1..=5_050).collect();
    factory::guild_config::GuildConfigFactory::new(db)
        .guild_id(5_001)
        .prefix("?")
        .build()
        .await?;

    let repo = GuildConfigRepository::new(db);
    let missing = repo.missing_guild_ids(&joined).await?;
    assert_eq!(missing.len(), 5_049);
    assert!(!missing.contains(&5_001));

    repo.insert_defaults(&missing, "!").await?;

    assert!(repo.missing_guild_ids(&joined).await?.is_empty());
    assert_eq!(entity::prelude::GuildConfig::find().count(db).await?, 5_050);
    assert_eq!(repo.find(5_001).await?.unwrap().prefix, "?");

    Ok(())
}

/// Tests the empty input.
///
/// Expected: Ok with nothing missing and no insert attempted
#[tokio::test]
async fn handles_no_guilds() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildConfigRepository::new(db);

    assert!(repo.missing_guild_ids(&[]).await?.is_empty());
    repo.insert_defaults(&[], "!").await?;

    Ok(())
}
