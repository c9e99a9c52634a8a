use super::*;

/// Tests fetching an existing guild document.
///
/// Expected: Ok(Some) with prefix and decoded autoresponders
#[tokio::test]
async fn returns_existing_document() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    GuildConfigFactory::new(db)
        .guild_id(42)
        .prefix("!")
        .autoresponder(serde_json::json!({
            "hello there": {
                "enabled": true,
                "response": "hi",
                "ignore_role": [1],
                "ignore_channel": []
            }
        }))
        .build()
        .await?;

    let repo = GuildConfigRepository::new(db);
    let config = repo.get_by_guild_id(42).await?.unwrap();

    assert_eq!(config.guild_id, 42);
    assert_eq!(config.prefix, "!");
    let autoresponders = config.autoresponder.unwrap();
    assert_eq!(autoresponders["hello there"].response, "hi");
    assert_eq!(autoresponders["hello there"].ignore_role, vec![1]);

    Ok(())
}

/// Tests fetching a guild without a document.
///
/// Expected: Ok(None)
#[tokio::test]
async fn returns_none_for_unknown_guild() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildConfigRepository::new(db);

    assert!(repo.get_by_guild_id(7).await?.is_none());

    Ok(())
}

/// Tests that malformed autoresponder entries are dropped while the rest are kept.
///
/// Expected: Ok with only the well-formed entry
#[tokio::test]
async fn drops_malformed_autoresponder_entries() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    GuildConfigFactory::new(db)
        .guild_id(42)
        .autoresponder(serde_json::json!({
            "hello there": "not an object",
            "ignored roles": { "enabled": true, "response": "x", "ignore_role": ["123"] },
            "good morning": { "enabled": true, "response": "gm" },
        }))
        .build()
        .await?;

    let repo = GuildConfigRepository::new(db);
    let autoresponders = repo.get_by_guild_id(42).await?.unwrap().autoresponder.unwrap();

    assert_eq!(autoresponders.len(), 1);
    assert_eq!(autoresponders["good morning"].response, "gm");

    Ok(())
}

/// Tests that an autoresponder section that is not an object reads as no section.
///
/// Expected: Ok with `autoresponder` set to None
#[tokio::test]
async fn ignores_autoresponder_section_that_is_not_an_object() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    GuildConfigFactory::new(db)
        .guild_id(43)
        .autoresponder(serde_json::json!(["hello there"]))
        .build()
        .await?;

    let repo = GuildConfigRepository::new(db);
    let config = repo.get_by_guild_id(43).await?.unwrap();

    assert!(config.autoresponder.is_none());

    Ok(())
}
