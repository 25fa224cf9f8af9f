use super::*;

/// Tests setting and clearing the log channel.
///
/// Expected: Ok with the channel stored, then cleared
#[tokio::test]
async fn sets_and_clears_log_channel() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild_config(db).await?;
    let guild_id = guild.guild_id as u64;

    let repo = GuildConfigRepository::new(db);

    let updated = repo.set_log_channel(guild_id, Some(9001)).await?;
    assert_eq!(updated.log_channel, Some(9001));

    let cleared = repo.set_log_channel(guild_id, None).await?;
    assert!(cleared.log_channel.is_none());

    Ok(())
}
