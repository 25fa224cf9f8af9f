use super::*;

/// Tests finding an existing guild configuration.
///
/// Expected: Ok(Some) with the stored prefix and channels converted to u64
#[tokio::test]
async fn finds_existing_guild() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::guild_config::GuildConfigFactory::new(db)
        .guild_id(123456789)
        .prefix("$")
        .log_channel(Some(555))
        .build()
        .await?;

    let repo = GuildConfigRepository::new(db);
    let settings = repo.find(123456789).await?.unwrap();

    assert_eq!(settings.guild_id, 123456789);
    assert_eq!(settings.prefix, "$");
    assert_eq!(settings.log_channel, Some(555));

    Ok(())
}

/// Tests finding a guild without a configuration row.
///
/// Expected: Ok(None)
#[tokio::test]
async fn returns_none_for_unknown_guild() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildConfigRepository::new(db);

    assert!(repo.find(42).await?.is_none());

    Ok(())
}
