//! In-memory autoresponder cache shared by the dispatcher, the commands and the flush job.
//!
//! Each guild's map lives behind its own DashMap shard lock. Every mutation is a single
//! synchronous closure so the lock is never held across an await point, and readers that
//! need to await work on a cloned snapshot.

use std::sync::Arc;

use dashmap::DashMap;

use crate::model::autoresponder::GuildAutoResponders;

/// Autoresponders of every cached guild.
#[derive(Clone, Default)]
pub struct AutoResponderStore {
    guilds: Arc<DashMap<u64, GuildAutoResponders>>,
}

impl AutoResponderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cached autoresponders of a guild.
    pub fn insert(&self, guild_id: u64, autoresponders: GuildAutoResponders) {
        self.guilds.insert(guild_id, autoresponders);
    }

    #[cfg(test)]
    pub fn contains_guild(&self, guild_id: u64) -> bool {
        self.guilds.contains_key(&guild_id)
    }

    /// Caches a guild if it is not cached yet.
    ///
    /// `seed` is only called for guilds that are missing.
    pub fn ensure_guild(&self, guild_id: u64, seed: impl FnOnce() -> GuildAutoResponders) {
        self.guilds.entry(guild_id).or_insert_with(seed);
    }

    /// Whether the guild is cached with at least one autoresponder.
    pub fn has_autoresponders(&self, guild_id: u64) -> bool {
        self.guilds
            .get(&guild_id)
            .is_some_and(|autoresponders| !autoresponders.is_empty())
    }

    /// Clone of a guild's autoresponders.
    pub fn snapshot(&self, guild_id: u64) -> Option<GuildAutoResponders> {
        self.guilds
            .get(&guild_id)
            .map(|autoresponders| autoresponders.clone())
    }

    /// Clone of every cached guild, used by the periodic flush.
    pub fn snapshot_all(&self) -> Vec<(u64, GuildAutoResponders)> {
        self.guilds
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    /// Runs `f` with exclusive access to a guild's autoresponders.
    ///
    /// # Returns
    /// - `Some(R)` - Result of `f`
    /// - `None` - The guild is not cached
    pub fn with_guild<R>(
        &self,
        guild_id: u64,
        f: impl FnOnce(&mut GuildAutoResponders) -> R,
    ) -> Option<R> {
        self.guilds
            .get_mut(&guild_id)
            .map(|mut autoresponders| f(autoresponders.value_mut()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::autoresponder::AutoResponder;

    fn autoresponders(names: &[&str]) -> GuildAutoResponders {
        names
            .iter()
            .map(|name| (name.to_string(), AutoResponder::new("hi")))
            .collect()
    }

    #[test]
    fn ensure_guild_only_seeds_missing_guilds() {
        let store = AutoResponderStore::new();
        store.insert(1, autoresponders(&["hello there"]));

        store.ensure_guild(1, || panic!("cached guild must not be reseeded"));
        store.ensure_guild(2, GuildAutoResponders::new);

        assert_eq!(store.snapshot(1).unwrap().len(), 1);
        assert!(store.contains_guild(2));
        assert!(!store.has_autoresponders(2));
    }

    #[test]
    fn with_guild_mutates_in_place() {
        let store = AutoResponderStore::new();
        store.insert(1, autoresponders(&["hello there"]));

        let removed = store.with_guild(1, |autoresponders| {
            autoresponders.shift_remove("hello there").is_some()
        });

        assert_eq!(removed, Some(true));
        assert!(store.snapshot(1).unwrap().is_empty());
        assert_eq!(store.with_guild(2, |_| ()), None);
    }

    #[test]
    fn snapshots_preserve_insertion_order() {
        let store = AutoResponderStore::new();
        store.insert(1, autoresponders(&["zebra stripes", "apple pie", "mango lassi"]));

        let names: Vec<String> = store.snapshot(1).unwrap().into_keys().collect();

        assert_eq!(names, vec!["zebra stripes", "apple pie", "mango lassi"]);
    }
}
