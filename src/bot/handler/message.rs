//! Message handler feeding the autoresponder dispatcher.

use serenity::all::{Cache, ChannelId, Context, GuildId, Message};

use crate::{
    model::message::{GuildDetails, InboundMessage},
    service::autoresponder::dispatch::AutoResponderDispatcher,
    state::BotState,
};

/// Handles a message by sending every autoresponse it triggers.
///
/// Responses are sent in order to the message's channel. A failed send is logged and the
/// remaining responses are still sent.
///
/// # Arguments
/// - `state` - Shared bot state
/// - `ctx` - Discord context used for the cache and HTTP client
/// - `message` - The inbound message
pub async fn handle_message(state: &BotState, ctx: Context, message: Message) {
    let dispatcher = AutoResponderDispatcher::new(
        &state.store,
        &state.limiter,
        &state.executor,
        &state.triggers,
    );

    let inbound = InboundMessage::from_message(&message);
    if !dispatcher.should_process(&inbound) {
        return;
    }

    let inbound = with_cached_details(&ctx.cache, inbound);
    let responses = dispatcher.dispatch(&inbound).await;

    for response in responses {
        if let Err(e) = message.channel_id.say(&ctx.http, &response).await {
            tracing::error!(
                "Failed to send autoresponse in channel {}: {}",
                message.channel_id,
                e
            );
        }
    }
}

/// Attaches the guild details and channel name from the cache.
///
/// Messages from guilds missing from the cache are returned unchanged. The cache guard is
/// released before returning.
pub fn with_cached_details(cache: &Cache, message: InboundMessage) -> InboundMessage {
    let Some(guild_id) = message.guild_id() else {
        return message;
    };

    let channel_id = ChannelId::new(message.channel_id);
    let details = cache.guild(GuildId::new(guild_id)).map(|guild| {
        let channel_name = guild
            .channels
            .get(&channel_id)
            .or_else(|| guild.threads.iter().find(|thread| thread.id == channel_id))
            .map(|channel| channel.name.clone());

        (GuildDetails::from_guild(&guild), channel_name)
    });

    match details {
        Some((details, channel_name)) => message.with_guild_details(Some(details), channel_name),
        None => message,
    }
}
