//! Guild configuration factory for creating test guild documents.

use crate::factory::helpers::next_id;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test guild configuration rows with customizable fields.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::factory::guild_config::GuildConfigFactory;
///
/// let config = GuildConfigFactory::new(&db)
///     .guild_id(987654321)
///     .prefix("!")
///     .build()
///     .await?;
/// ```
pub struct GuildConfigFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: u64,
    prefix: String,
    autoresponder: Option<serde_json::Value>,
}

impl<'a> GuildConfigFactory<'a> {
    /// Creates a new GuildConfigFactory with default values.
    ///
    /// Defaults:
    /// - guild_id: auto-incremented unique ID
    /// - prefix: `"$"`
    /// - autoresponder: `None`
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self {
            db,
            guild_id: next_id(),
            prefix: "$".to_string(),
            autoresponder: None,
        }
    }

    pub fn guild_id(mut self, guild_id: u64) -> Self {
        self.guild_id = guild_id;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the raw autoresponder JSON document.
    pub fn autoresponder(mut self, document: serde_json::Value) -> Self {
        self.autoresponder = Some(document);
        self
    }

    /// Builds and inserts the guild configuration row.
    ///
    /// # Returns
    /// - `Ok(entity::guild_config::Model)` - Created row
    /// - `Err(DbErr)` - Database error during insert
    pub async fn build(self) -> Result<entity::guild_config::Model, DbErr> {
        let now = Utc::now();
        entity::guild_config::ActiveModel {
            guild_id: ActiveValue::Set(self.guild_id.to_string()),
            prefix: ActiveValue::Set(self.prefix),
            autoresponder: ActiveValue::Set(self.autoresponder),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(self.db)
        .await
    }
}

/// Creates a guild configuration row with default values.
///
/// Shorthand for `GuildConfigFactory::new(db).build().await`.
pub async fn create_guild_config(
    db: &DatabaseConnection,
) -> Result<entity::guild_config::Model, DbErr> {
    GuildConfigFactory::new(db).build().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TestBuilder;
    use entity::prelude::*;

    #[tokio::test]
    async fn creates_guild_config_with_defaults() -> Result<(), DbErr> {
        let test = TestBuilder::new()
            .with_table(GuildConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let config = create_guild_config(db).await?;

        assert!(config.guild_id.parse::<u64>().is_ok());
        assert_eq!(config.prefix, "$");
        assert!(config.autoresponder.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn creates_guild_config_with_custom_values() -> Result<(), DbErr> {
        let test = TestBuilder::new()
            .with_table(GuildConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let document = serde_json::json!({ "hello there": { "enabled": true, "response": "hi" } });
        let config = GuildConfigFactory::new(db)
            .guild_id(987654321)
            .prefix("!")
            .autoresponder(document.clone())
            .build()
            .await?;

        assert_eq!(config.guild_id, "987654321");
        assert_eq!(config.prefix, "!");
        assert_eq!(config.autoresponder, Some(document));

        Ok(())
    }

    #[tokio::test]
    async fn creates_multiple_unique_guild_configs() -> Result<(), DbErr> {
        let test = TestBuilder::new()
            .with_table(GuildConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let first = create_guild_config(db).await?;
        let second = create_guild_config(db).await?;

        assert_ne!(first.guild_id, second.guild_id);

        Ok(())
    }
}
