use super::*;

/// Tests loading custom commands of several guilds.
///
/// Expected: Ok with commands of the requested guilds only
#[tokio::test]
async fn loads_commands_of_requested_guilds() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_moderation_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let first = factory::create_guild_config(db).await?;
    let second = factory::create_guild_config(db).await?;
    let other = factory::create_guild_config(db).await?;

    factory::create_custom_command(db, first.guild_id).await?;
    factory::create_custom_command(db, first.guild_id).await?;
    factory::create_custom_command(db, second.guild_id).await?;
    factory::create_custom_command(db, other.guild_id).await?;

    let repo = CustomCommandRepository::new(db);
    let commands = repo
        .get_many(&[first.guild_id as u64, second.guild_id as u64])
        .await?;

    assert_eq!(commands.len(), 3);
    assert!(commands
        .iter()
        .all(|c| c.guild_id != other.guild_id as u64));

    Ok(())
}
