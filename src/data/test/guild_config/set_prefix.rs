use super::*;

/// Tests updating the prefix of an existing guild.
///
/// Expected: Ok with new prefix persisted and other columns untouched
#[tokio::test]
async fn updates_prefix() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::guild_config::GuildConfigFactory::new(db)
        .enable_cc(true)
        .build()
        .await?;

    let repo = GuildConfigRepository::new(db);
    let updated = repo.set_prefix(guild.guild_id as u64, "$").await?;

    assert_eq!(updated.prefix, "$");
    assert!(updated.enable_cc);
    assert_eq!(
        repo.find(guild.guild_id as u64).await?.unwrap().prefix,
        "$"
    );

    Ok(())
}

/// Tests updating the prefix of a guild without a row.
///
/// Expected: Err
#[tokio::test]
async fn fails_for_unknown_guild() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildConfigRepository::new(db);

    assert!(repo.set_prefix(404, "$").await.is_err());

    Ok(())
}
