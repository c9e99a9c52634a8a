use super::*;

fn sample_autoresponders() -> GuildAutoResponders {
    let mut map = GuildAutoResponders::new();
    map.insert("good morning".to_string(), AutoResponder::new("gm {{ author.name }}"));
    let mut muted = AutoResponder::new("shh");
    muted.enabled = false;
    muted.ignore_channel.push(55);
    map.insert("be quiet please".to_string(), muted);
    map
}

/// Tests replacing the autoresponder section of an existing document.
///
/// Expected: Ok with the stored section equal to the written map and prefix unchanged
#[tokio::test]
async fn replaces_existing_section() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    GuildConfigFactory::new(db)
        .guild_id(5)
        .prefix("!")
        .autoresponder(serde_json::json!({ "old trigger": { "enabled": true, "response": "old" } }))
        .build()
        .await?;

    let repo = GuildConfigRepository::new(db);
    let written = sample_autoresponders();
    repo.set_autoresponders(5, &written, "$").await?;

    let config = repo.get_by_guild_id(5).await?.unwrap();
    assert_eq!(config.prefix, "!");
    assert_eq!(config.autoresponder, Some(written));

    Ok(())
}

/// Tests that writing for a guild without a document creates one.
///
/// Expected: Ok with a new row carrying the default prefix
#[tokio::test]
async fn creates_document_when_missing() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildConfigRepository::new(db);
    repo.set_autoresponders(6, &sample_autoresponders(), "$")
        .await?;

    let config = repo.get_by_guild_id(6).await?.unwrap();
    assert_eq!(config.prefix, "$");
    assert_eq!(config.autoresponder.unwrap().len(), 2);

    Ok(())
}

/// Tests that an empty map is stored as an empty section rather than removed.
///
/// Expected: Ok with `Some(empty)` and the guild still listed at load time
#[tokio::test]
async fn stores_empty_section() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildConfigRepository::new(db);
    repo.set_autoresponders(8, &GuildAutoResponders::new(), "$")
        .await?;

    let config = repo.get_by_guild_id(8).await?.unwrap();
    assert_eq!(config.autoresponder, Some(GuildAutoResponders::new()));
    assert_eq!(repo.get_all_with_autoresponders().await?.len(), 1);

    Ok(())
}

/// Tests that a second write over a document created by a first write replaces it in place.
///
/// Expected: Ok with a single row holding the latest map
#[tokio::test]
async fn second_write_replaces_first() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildConfigRepository::new(db);
    repo.set_autoresponders(9, &sample_autoresponders(), "$")
        .await?;

    let mut latest = GuildAutoResponders::new();
    latest.insert("good night".to_string(), AutoResponder::new("gn"));
    repo.set_autoresponders(9, &latest, "!").await?;

    let count = entity::prelude::GuildConfig::find().count(db).await?;
    assert_eq!(count, 1);
    let config = repo.get_by_guild_id(9).await?.unwrap();
    assert_eq!(config.prefix, "$");
    assert_eq!(config.autoresponder, Some(latest));

    Ok(())
}

/// Tests creating a document and writing its section at the same time.
///
/// Expected: Ok from both calls with a single row holding the written map
#[tokio::test]
async fn concurrent_ensure_and_write_share_one_row() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildConfigRepository::new(db);
    let written = sample_autoresponders();
    let (ensured, set) = tokio::join!(
        repo.ensure(7, "$"),
        repo.set_autoresponders(7, &written, "$")
    );
    ensured?;
    set?;

    let count = entity::prelude::GuildConfig::find().count(db).await?;
    assert_eq!(count, 1);
    let config = repo.get_by_guild_id(7).await?.unwrap();
    assert_eq!(config.autoresponder, Some(written));

    Ok(())
}
