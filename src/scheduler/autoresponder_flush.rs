//! Periodic write-back of cached autoresponders.
//!
//! The in-memory store is the source of truth while the bot runs. Every five minutes each
//! cached guild's autoresponders are written to its configuration document as a full
//! replace. Stopping the scheduler does not trigger a final flush.

use std::time::Duration;

use sea_orm::DatabaseConnection;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{
    data::guild_config::GuildConfigRepository, error::AppError,
    service::autoresponder::store::AutoResponderStore,
};

/// Interval between two flushes.
pub const FLUSH_INTERVAL: Duration = Duration::from_secs(300);

/// Starts the autoresponder flush scheduler.
///
/// # Arguments
/// - `db` - Database connection
/// - `store` - Autoresponder store to flush
/// - `default_prefix` - Prefix stored for guilds that have no document yet
///
/// # Returns
/// - `Ok(JobScheduler)` - Running scheduler; call `shutdown` on it to stop flushing
/// - `Err(AppError)` - The scheduler could not be created or started
pub async fn start_scheduler(
    db: DatabaseConnection,
    store: AutoResponderStore,
    default_prefix: String,
) -> Result<JobScheduler, AppError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_repeated_async(FLUSH_INTERVAL, move |_uuid, _lock| {
        let db = db.clone();
        let store = store.clone();
        let default_prefix = default_prefix.clone();

        Box::pin(async move {
            let count = flush_autoresponders(&db, &store, &default_prefix).await;
            tracing::debug!("Flushed autoresponders of {} guilds", count);
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!("Autoresponder flush scheduler started");

    Ok(scheduler)
}

/// Writes every cached guild's autoresponders to the database.
///
/// A failing guild is logged and skipped so that one bad write does not hold back the
/// others.
///
/// # Returns
/// - `usize` - Number of guilds written successfully
pub async fn flush_autoresponders(
    db: &DatabaseConnection,
    store: &AutoResponderStore,
    default_prefix: &str,
) -> usize {
    let repo = GuildConfigRepository::new(db);
    let mut flushed = 0;

    for (guild_id, autoresponders) in store.snapshot_all() {
        match repo
            .set_autoresponders(guild_id, &autoresponders, default_prefix)
            .await
        {
            Ok(()) => flushed += 1,
            Err(e) => tracing::error!(
                "Failed to flush autoresponders of guild {}: {}",
                guild_id,
                e
            ),
        }
    }

    flushed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::autoresponder::{AutoResponder, GuildAutoResponders};
    use entity::prelude::GuildConfig;
    use test_utils::{builder::TestBuilder, factory::guild_config::GuildConfigFactory};

    fn autoresponders(names: &[&str]) -> GuildAutoResponders {
        names
            .iter()
            .map(|name| (name.to_string(), AutoResponder::new("hi")))
            .collect()
    }

    /// Tests flushing guilds with and without an existing document.
    ///
    /// Expected: every cached guild is written as a full replace
    #[tokio::test]
    async fn flush_writes_every_cached_guild() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(GuildConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        GuildConfigFactory::new(db)
            .guild_id(1)
            .prefix("!")
            .autoresponder(serde_json::json!({
                "stale entry": { "enabled": true, "response": "old" }
            }))
            .build()
            .await?;
        let store = AutoResponderStore::new();
        store.insert(1, autoresponders(&["hello there"]));
        store.insert(2, autoresponders(&["good morning"]));

        let flushed = flush_autoresponders(db, &store, "$").await;

        assert_eq!(flushed, 2);
        let repo = GuildConfigRepository::new(db);
        let first = repo.get_by_guild_id(1).await?.unwrap();
        let second = repo.get_by_guild_id(2).await?.unwrap();
        assert_eq!(first.prefix, "!");
        assert_eq!(first.autoresponder, Some(autoresponders(&["hello there"])));
        assert_eq!(second.prefix, "$");
        assert_eq!(second.autoresponder, Some(autoresponders(&["good morning"])));

        Ok(())
    }

    /// Tests flushing a guild whose autoresponders were all removed.
    ///
    /// Expected: the stored section is replaced with an empty map
    #[tokio::test]
    async fn flush_persists_removals() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(GuildConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        GuildConfigFactory::new(db)
            .guild_id(1)
            .autoresponder(serde_json::json!({
                "hello there": { "enabled": true, "response": "hi" }
            }))
            .build()
            .await?;
        let store = AutoResponderStore::new();
        store.insert(1, GuildAutoResponders::new());

        assert_eq!(flush_autoresponders(db, &store, "$").await, 1);

        let stored = GuildConfigRepository::new(db)
            .get_by_guild_id(1)
            .await?
            .unwrap();
        assert_eq!(stored.autoresponder, Some(GuildAutoResponders::new()));

        Ok(())
    }
}
