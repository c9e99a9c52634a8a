//! Autoresponder configuration as stored per guild.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// All autoresponders of one guild, keyed by trigger name in insertion order.
pub type GuildAutoResponders = IndexMap<String, AutoResponder>;

/// A single autoresponder.
///
/// The trigger name is the key of the owning [`GuildAutoResponders`] map and doubles as the
/// match pattern. Missing fields in stored documents decode to their defaults so that
/// partially written documents still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoResponder {
    #[serde(default)]
    pub enabled: bool,
    /// Template source rendered when the trigger matches.
    #[serde(default)]
    pub response: String,
    /// Role IDs whose members never trigger this autoresponder.
    #[serde(default)]
    pub ignore_role: Vec<u64>,
    /// Channel IDs in which this autoresponder never fires.
    #[serde(default)]
    pub ignore_channel: Vec<u64>,
}

impl AutoResponder {
    /// Creates an enabled autoresponder with empty ignore lists.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            enabled: true,
            response: response.into(),
            ignore_role: Vec::new(),
            ignore_channel: Vec::new(),
        }
    }

    pub fn ignores_channel(&self, channel_id: u64) -> bool {
        self.ignore_channel.contains(&channel_id)
    }

    pub fn ignores_any_role(&self, role_ids: &[u64]) -> bool {
        role_ids.iter().any(|role| self.ignore_role.contains(role))
    }
}
