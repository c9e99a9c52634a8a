//! Bot state shared by the event handler, the command framework and the scheduler.
//!
//! The state is built once during startup and cloned into each consumer. Every field is
//! cheap to clone: the database handle is a pool and the caches share their maps through
//! `Arc`.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::service::{
    autoresponder::{dispatch::TriggerCache, store::AutoResponderStore},
    guild_config::GuildConfigCache,
    lock::KeyedLock,
    ratelimit::AutoResponderRateLimiter,
    template::TemplateExecutor,
};

#[derive(Clone)]
pub struct BotState {
    /// Database connection pool.
    pub db: DatabaseConnection,

    /// Cached autoresponders of every loaded guild.
    ///
    /// Written back to the database by the periodic flush.
    pub store: AutoResponderStore,

    /// Guild configuration snapshots, used for prefixes and to seed the store.
    pub guild_configs: GuildConfigCache,

    pub executor: TemplateExecutor,

    /// Compiled autoresponder triggers.
    pub triggers: TriggerCache,

    /// Per-channel autoresponse rate limiter.
    pub limiter: Arc<AutoResponderRateLimiter>,

    /// Per-author lock for commands that render templates.
    pub locks: KeyedLock<u64>,

    /// Command prefix for guilds without a stored prefix.
    pub default_prefix: String,
}

impl BotState {
    /// Creates the state with empty caches.
    ///
    /// # Arguments
    /// - `db` - Database connection pool
    /// - `default_prefix` - Command prefix used until a guild's configuration is loaded
    pub fn new(db: DatabaseConnection, default_prefix: String) -> Self {
        Self {
            db,
            store: AutoResponderStore::new(),
            guild_configs: GuildConfigCache::new(),
            executor: TemplateExecutor::new(),
            triggers: TriggerCache::new(),
            limiter: Arc::new(AutoResponderRateLimiter::default()),
            locks: KeyedLock::new(),
            default_prefix,
        }
    }

    /// Command prefix of a guild, falling back to the default prefix.
    pub fn prefix(&self, guild_id: Option<u64>) -> String {
        guild_id
            .and_then(|guild_id| self.guild_configs.prefix(guild_id))
            .unwrap_or_else(|| self.default_prefix.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::guild_config::GuildConfig;
    use chrono::Utc;
    use test_utils::builder::TestBuilder;

    /// Tests prefix lookup for cached and unknown guilds.
    ///
    /// Expected: cached guild prefix for loaded guilds, default prefix otherwise
    #[tokio::test]
    async fn prefix_falls_back_to_default() {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let state = BotState::new(db.clone(), "$".to_string());

        state.guild_configs.insert(GuildConfig {
            guild_id: 1,
            prefix: "!".to_string(),
            autoresponder: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });

        assert_eq!(state.prefix(Some(1)), "!");
        assert_eq!(state.prefix(Some(2)), "$");
        assert_eq!(state.prefix(None), "$");
    }
}
