use super::*;

/// Tests deleting an existing and a missing custom command.
///
/// Expected: Ok(true) then Ok(false)
#[tokio::test]
async fn deletes_existing_command() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_moderation_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild_config(db).await?;
    let command = factory::custom_command::CustomCommandFactory::new(db, guild.guild_id)
        .command("hello")
        .build()
        .await?;

    let repo = CustomCommandRepository::new(db);

    assert!(repo.delete(command.guild_id as u64, "hello").await?);
    assert!(!repo.delete(command.guild_id as u64, "hello").await?);
    assert!(repo.find(command.guild_id as u64, "hello").await?.is_none());

    Ok(())
}
