use super::*;

/// Tests creating a document for a guild that has none.
///
/// Expected: Ok with a new document using the default prefix and no autoresponders
#[tokio::test]
async fn creates_missing_document() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildConfigRepository::new(db);
    let config = repo.ensure(99, "?").await?;

    assert_eq!(config.guild_id, 99);
    assert_eq!(config.prefix, "?");
    assert!(config.autoresponder.is_none());

    let count = entity::prelude::GuildConfig::find().count(db).await?;
    assert_eq!(count, 1);

    Ok(())
}

/// Tests that an existing document is returned untouched.
///
/// Expected: Ok with the stored prefix, no second row
#[tokio::test]
async fn keeps_existing_document() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    GuildConfigFactory::new(db).guild_id(99).prefix("!").build().await?;

    let repo = GuildConfigRepository::new(db);
    let config = repo.ensure(99, "?").await?;

    assert_eq!(config.prefix, "!");

    let count = entity::prelude::GuildConfig::find().count(db).await?;
    assert_eq!(count, 1);

    Ok(())
}
