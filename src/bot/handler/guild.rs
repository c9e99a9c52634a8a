//! Guild availability handlers.
//!
//! Guild configuration documents are loaded into the configuration cache when a guild
//! becomes available, creating the document for guilds the bot has just joined. The
//! autoresponder store is not touched here; it is populated at startup and seeded lazily
//! by the autoresponder commands.

use serenity::all::{Context, Guild, UnavailableGuild};

use crate::state::BotState;

/// Handles a guild becoming available or the bot joining a new guild.
///
/// # Arguments
/// - `state` - Shared bot state
/// - `ctx` - Discord context
/// - `guild` - Full guild data
/// - `is_new` - Whether the bot has just joined the guild
pub async fn handle_guild_create(
    state: &BotState,
    _ctx: Context,
    guild: Guild,
    is_new: Option<bool>,
) {
    let guild_id = guild.id.get();

    tracing::debug!(
        "Guild create event: {} ({}) - member_count: {}, new: {:?}",
        guild.name,
        guild_id,
        guild.member_count,
        is_new
    );

    if let Err(e) = state
        .guild_configs
        .load(&state.db, guild_id, &state.default_prefix)
        .await
    {
        tracing::error!("Failed to load configuration of guild {}: {:?}", guild_id, e);
    }
}

/// Handles the bot leaving a guild.
///
/// Outages are reported through the same event with `unavailable` set; the cached
/// configuration is kept for those.
pub async fn handle_guild_delete(
    state: &BotState,
    _ctx: Context,
    incomplete: UnavailableGuild,
    _full: Option<Guild>,
) {
    if incomplete.unavailable {
        tracing::debug!("Guild {} became unavailable", incomplete.id);
        return;
    }

    state.guild_configs.remove(incomplete.id.get());

    tracing::info!("Removed from guild {}", incomplete.id);
}
