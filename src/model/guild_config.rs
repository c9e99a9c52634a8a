//! Domain model for the per-guild configuration document.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::{
    error::AppError,
    model::autoresponder::{AutoResponder, GuildAutoResponders},
};

/// Prefix assigned to guilds that have never configured one.
pub const DEFAULT_PREFIX: &str = "$";

/// Configuration document of a single guild.
#[derive(Debug, Clone, PartialEq)]
pub struct GuildConfig {
    /// Discord guild ID.
    pub guild_id: u64,
    /// Command prefix for prefix commands in this guild.
    pub prefix: String,
    /// Stored autoresponders, `None` if the guild never saved any.
    pub autoresponder: Option<GuildAutoResponders>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GuildConfig {
    /// Converts an entity model to a guild config domain model at the repository boundary.
    ///
    /// # Arguments
    /// - `entity` - The entity model from the database
    ///
    /// # Returns
    /// - `Ok(GuildConfig)` - The converted domain model
    /// - `Err(AppError::InternalError)` - The stored guild ID is not a snowflake
    pub fn from_entity(entity: entity::guild_config::Model) -> Result<Self, AppError> {
        let guild_id = entity.guild_id.parse::<u64>().map_err(|e| {
            AppError::InternalError(format!(
                "Failed to parse guild ID from String '{}': {}",
                entity.guild_id, e
            ))
        })?;
        let autoresponder = entity
            .autoresponder
            .and_then(|document| decode_autoresponders(guild_id, document));

        Ok(Self {
            guild_id,
            prefix: entity.prefix,
            autoresponder,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

/// Decodes a stored autoresponder section entry by entry.
///
/// Entries that do not decode are logged and dropped so that one bad entry does not
/// hide the rest of the guild's autoresponders. A section that is not a JSON object is
/// dropped as a whole.
fn decode_autoresponders(
    guild_id: u64,
    document: serde_json::Value,
) -> Option<GuildAutoResponders> {
    let entries: IndexMap<String, serde_json::Value> = match serde_json::from_value(document) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(
                "Ignoring malformed autoresponder section of guild {}: {}",
                guild_id,
                e
            );
            return None;
        }
    };

    let autoresponders = entries
        .into_iter()
        .filter_map(
            |(name, entry)| match serde_json::from_value::<AutoResponder>(entry) {
                Ok(autoresponder) => Some((name, autoresponder)),
                Err(e) => {
                    tracing::error!(
                        "Ignoring malformed autoresponder `{}` of guild {}: {}",
                        name,
                        guild_id,
                        e
                    );
                    None
                }
            },
        )
        .collect();

    Some(autoresponders)
}
