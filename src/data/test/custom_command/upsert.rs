use super::*;

/// Tests creating and then replacing a custom command.
///
/// Expected: Ok with the response replaced rather than a duplicate row
#[tokio::test]
async fn creates_then_replaces_response() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_moderation_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild_config(db).await?;
    let guild_id = guild.guild_id as u64;

    let repo = CustomCommandRepository::new(db);
    repo.upsert(guild_id, "rules", "Be nice.").await?;
    let updated = repo.upsert(guild_id, "rules", "Be very nice.").await?;

    assert_eq!(updated.response, "Be very nice.");
    assert_eq!(repo.get_many(&[guild_id]).await?.len(), 1);
    assert_eq!(
        repo.find(guild_id, "rules").await?.unwrap().response,
        "Be very nice."
    );

    Ok(())
}
