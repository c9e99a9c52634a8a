//! In-memory snapshot of guild configuration documents.
//!
//! Documents are loaded when a guild becomes available and read by the command framework
//! for the guild prefix and by the autoresponder store when it seeds a guild.

use std::sync::Arc;

use dashmap::DashMap;
use sea_orm::DatabaseConnection;

use crate::{
    data::guild_config::GuildConfigRepository,
    error::AppError,
    model::{autoresponder::GuildAutoResponders, guild_config::GuildConfig},
};

/// Shared cache of guild configuration documents keyed by guild ID.
#[derive(Clone, Default)]
pub struct GuildConfigCache {
    configs: Arc<DashMap<u64, GuildConfig>>,
}

impl GuildConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a guild's document into the cache, creating the document if it is missing.
    ///
    /// # Arguments
    /// - `db` - Database connection
    /// - `guild_id` - Discord guild ID
    /// - `default_prefix` - Prefix stored for guilds without a document
    ///
    /// # Returns
    /// - `Ok(GuildConfig)` - The cached document
    /// - `Err(AppError)` - Database error or malformed stored document
    pub async fn load(
        &self,
        db: &DatabaseConnection,
        guild_id: u64,
        default_prefix: &str,
    ) -> Result<GuildConfig, AppError> {
        let config = GuildConfigRepository::new(db)
            .ensure(guild_id, default_prefix)
            .await?;

        self.insert(config.clone());

        Ok(config)
    }

    pub fn insert(&self, config: GuildConfig) {
        self.configs.insert(config.guild_id, config);
    }

    pub fn remove(&self, guild_id: u64) {
        self.configs.remove(&guild_id);
    }

    /// Prefix configured for a guild, if its document is cached.
    pub fn prefix(&self, guild_id: u64) -> Option<String> {
        self.configs
            .get(&guild_id)
            .map(|config| config.prefix.clone())
    }

    /// Autoresponders stored in the cached document of a guild.
    pub fn autoresponders(&self, guild_id: u64) -> Option<GuildAutoResponders> {
        self.configs
            .get(&guild_id)
            .and_then(|config| config.autoresponder.clone())
    }
}
