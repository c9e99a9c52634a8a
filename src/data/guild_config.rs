//! Guild configuration repository for database operations.
//!
//! This module provides the `GuildConfigRepository` for reading and writing the per-guild
//! configuration document. The autoresponder section is written only as a full replace of
//! the guild's JSON document, never incrementally.

use chrono::Utc;
use migration::OnConflict;
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

use crate::{
    error::AppError,
    model::{autoresponder::GuildAutoResponders, guild_config::GuildConfig},
};

/// Repository providing database operations for guild configuration documents.
pub struct GuildConfigRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GuildConfigRepository<'a> {
    /// Creates a new GuildConfigRepository instance.
    ///
    /// # Arguments
    /// - `db` - Reference to the database connection
    ///
    /// # Returns
    /// - `GuildConfigRepository` - New repository instance
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets the configuration document for a guild.
    ///
    /// # Arguments
    /// - `guild_id` - Discord guild ID
    ///
    /// # Returns
    /// - `Ok(Some(GuildConfig))` - Document found
    /// - `Ok(None)` - The guild has no document yet
    /// - `Err(AppError)` - Database error or malformed stored document
    pub async fn get_by_guild_id(&self, guild_id: u64) -> Result<Option<GuildConfig>, AppError> {
        let entity = entity::prelude::GuildConfig::find_by_id(guild_id.to_string())
            .one(self.db)
            .await?;

        entity.map(GuildConfig::from_entity).transpose()
    }

    /// Gets every guild document that contains an autoresponder section.
    ///
    /// Used once at startup to populate the autoresponder cache. Rows that cannot be
    /// converted are logged and skipped so that the remaining guilds still load.
    ///
    /// # Returns
    /// - `Ok(Vec<GuildConfig>)` - Readable documents whose autoresponder column is not null
    /// - `Err(AppError)` - Database error
    pub async fn get_all_with_autoresponders(&self) -> Result<Vec<GuildConfig>, AppError> {
        let entities = entity::prelude::GuildConfig::find()
            .filter(entity::guild_config::Column::Autoresponder.is_not_null())
            .all(self.db)
            .await?;

        let configs = entities
            .into_iter()
            .filter_map(|entity| {
                let guild_id = entity.guild_id.clone();
                match GuildConfig::from_entity(entity) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::error!("Skipping guild config row {}: {}", guild_id, e);
                        None
                    }
                }
            })
            .collect();

        Ok(configs)
    }

    /// Gets the configuration document for a guild, creating it when missing.
    ///
    /// # Arguments
    /// - `guild_id` - Discord guild ID
    /// - `default_prefix` - Prefix stored if the document has to be created
    ///
    /// # Returns
    /// - `Ok(GuildConfig)` - The existing or newly created document
    /// - `Err(AppError)` - Database error or malformed stored document
    pub async fn ensure(&self, guild_id: u64, default_prefix: &str) -> Result<GuildConfig, AppError> {
        if let Some(existing) = self.get_by_guild_id(guild_id).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let result = entity::prelude::GuildConfig::insert(entity::guild_config::ActiveModel {
            guild_id: ActiveValue::Set(guild_id.to_string()),
            prefix: ActiveValue::Set(default_prefix.to_string()),
            autoresponder: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        })
        .on_conflict(
            OnConflict::column(entity::guild_config::Column::GuildId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(self.db)
        .await;

        // Another writer created the row between the read and the insert.
        match result {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }

        self.get_by_guild_id(guild_id).await?.ok_or_else(|| {
            AppError::InternalError(format!(
                "Guild config {} missing after insert",
                guild_id
            ))
        })
    }

    /// Overwrites the autoresponder section of a guild's document.
    ///
    /// Replaces the whole section with `autoresponders` in a single upsert. If the guild
    /// has no document yet one is created with `default_prefix`; an existing prefix is
    /// left untouched.
    ///
    /// # Arguments
    /// - `guild_id` - Discord guild ID
    /// - `autoresponders` - Complete autoresponder map for the guild
    /// - `default_prefix` - Prefix stored if the document has to be created
    ///
    /// # Returns
    /// - `Ok(())` - Section written
    /// - `Err(AppError)` - Database or serialization error
    pub async fn set_autoresponders(
        &self,
        guild_id: u64,
        autoresponders: &GuildAutoResponders,
        default_prefix: &str,
    ) -> Result<(), AppError> {
        let document = serde_json::to_value(autoresponders)?;
        let now = Utc::now();

        entity::prelude::GuildConfig::insert(entity::guild_config::ActiveModel {
            guild_id: ActiveValue::Set(guild_id.to_string()),
            prefix: ActiveValue::Set(default_prefix.to_string()),
            autoresponder: ActiveValue::Set(Some(document)),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        })
        .on_conflict(
            OnConflict::column(entity::guild_config::Column::GuildId)
                .update_columns([
                    entity::guild_config::Column::Autoresponder,
                    entity::guild_config::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(self.db)
        .await?;

        Ok(())
    }
}
