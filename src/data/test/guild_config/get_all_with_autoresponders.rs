use super::*;

/// Tests that only documents with an autoresponder section are returned.
///
/// Expected: Ok with the two guilds that have autoresponders
#[tokio::test]
async fn skips_documents_without_autoresponders() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    GuildConfigFactory::new(db)
        .guild_id(1)
        .autoresponder(serde_json::json!({}))
        .build()
        .await?;
    GuildConfigFactory::new(db).guild_id(2).build().await?;
    GuildConfigFactory::new(db)
        .guild_id(3)
        .autoresponder(serde_json::json!({ "good morning": { "enabled": true, "response": "gm" } }))
        .build()
        .await?;

    let repo = GuildConfigRepository::new(db);
    let mut configs = repo.get_all_with_autoresponders().await?;
    configs.sort_by_key(|config| config.guild_id);

    let ids: Vec<u64> = configs.iter().map(|config| config.guild_id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert!(configs[0].autoresponder.as_ref().unwrap().is_empty());
    assert_eq!(configs[1].autoresponder.as_ref().unwrap().len(), 1);

    Ok(())
}

/// Tests loading from an empty table.
///
/// Expected: Ok with no documents
#[tokio::test]
async fn returns_empty_for_empty_table() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildConfigRepository::new(db);

    assert!(repo.get_all_with_autoresponders().await?.is_empty());

    Ok(())
}

/// Tests that a row whose guild ID is not a snowflake is skipped instead of failing the load.
///
/// Expected: Ok with only the readable guild
#[tokio::test]
async fn skips_unreadable_rows() -> Result<(), AppError> {
    use sea_orm::{ActiveModelTrait, ActiveValue};

    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    GuildConfigFactory::new(db)
        .guild_id(1)
        .autoresponder(serde_json::json!({ "good morning": { "enabled": true, "response": "gm" } }))
        .build()
        .await?;
    let now = chrono::Utc::now();
    entity::guild_config::ActiveModel {
        guild_id: ActiveValue::Set("not a snowflake".to_string()),
        prefix: ActiveValue::Set("$".to_string()),
        autoresponder: ActiveValue::Set(Some(serde_json::json!({}))),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    }
    .insert(db)
    .await?;

    let repo = GuildConfigRepository::new(db);
    let configs = repo.get_all_with_autoresponders().await?;

    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].guild_id, 1);

    Ok(())
}

/// Tests that a guild with one malformed entry still loads its other entries.
///
/// Expected: Ok with both guilds, the malformed entry dropped
#[tokio::test]
async fn keeps_guilds_with_malformed_entries() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    GuildConfigFactory::new(db)
        .guild_id(1)
        .autoresponder(serde_json::json!({ "good morning": { "enabled": true, "response": "gm" } }))
        .build()
        .await?;
    GuildConfigFactory::new(db)
        .guild_id(2)
        .autoresponder(serde_json::json!({
            "ignored roles": { "enabled": true, "response": "x", "ignore_role": ["123"] },
            "good night": { "enabled": true, "response": "gn" },
        }))
        .build()
        .await?;

    let repo = GuildConfigRepository::new(db);
    let mut configs = repo.get_all_with_autoresponders().await?;
    configs.sort_by_key(|config| config.guild_id);

    assert_eq!(configs.len(), 2);
    let second = configs[1].autoresponder.as_ref().unwrap();
    assert_eq!(second.len(), 1);
    assert!(second.contains_key("good night"));

    Ok(())
}
