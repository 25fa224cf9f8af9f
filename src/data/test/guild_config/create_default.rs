use super::*;

/// Tests that a fresh row carries the default prefix and nothing else.
///
/// Verifies custom commands start disabled and all three optional channels are unset.
///
/// Expected: Ok with default row
#[tokio::test]
async fn creates_row_with_defaults() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildConfigRepository::new(db);
    let settings = repo.create_default(777, "!").await?;

    assert_eq!(settings.guild_id, 777);
    assert_eq!(settings.prefix, "!");
    assert!(!settings.enable_cc);
    assert!(settings.log_channel.is_none());
    assert!(settings.welcome_channel.is_none());
    assert!(settings.system_channel.is_none());

    Ok(())
}

/// Tests that a guild cannot get a second row.
///
/// Expected: Err on duplicate primary key
#[tokio::test]
async fn rejects_duplicate_row() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildConfigRepository::new(db);
    repo.create_default(777, "!").await?;

    assert!(repo.create_default(777, "?").await.is_err());
    assert_eq!(entity::prelude::GuildConfig::find().count(db).await?, 1);

    Ok(())
}
