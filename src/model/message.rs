//! Platform-independent view of an inbound chat message.
//!
//! The autoresponder pipeline only needs a handful of fields from Serenity's `Message`.
//! Extracting them up front keeps the dispatcher and variable builder testable without a
//! gateway connection and lets commands describe their own invocation the same way.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use serenity::all::{Guild, Message};

/// Author of an inbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageAuthor {
    pub id: u64,
    pub name: String,
    /// Global display name, if the user set one.
    pub global_name: Option<String>,
    /// Guild nickname, if the message was sent in a guild and the member has one.
    pub nick: Option<String>,
    pub bot: bool,
    /// Role IDs of the author in the message's guild; empty outside of guilds.
    pub role_ids: Vec<u64>,
}

impl MessageAuthor {
    /// Name shown in the client: nickname, then global name, then username.
    pub fn display_name(&self) -> &str {
        self.nick
            .as_deref()
            .or(self.global_name.as_deref())
            .unwrap_or(&self.name)
    }
}

/// Guild a message was sent in.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageGuild {
    pub id: u64,
    /// Resolved from the cache, when available.
    pub details: Option<GuildDetails>,
}

/// Cached guild fields exposed to templates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuildDetails {
    pub name: String,
    pub member_count: u64,
    pub owner_id: u64,
    /// Username of the owner, if the owner is a cached member.
    pub owner_name: Option<String>,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub banner_url: Option<String>,
    pub splash_url: Option<String>,
    pub vanity_url_code: Option<String>,
    pub premium_tier: u8,
    pub premium_subscription_count: Option<u64>,
    pub preferred_locale: String,
}

impl GuildDetails {
    /// Copies the exposed fields out of a cached guild.
    pub fn from_guild(guild: &Guild) -> Self {
        let id = guild.id.get();

        Self {
            name: guild.name.clone(),
            member_count: guild.member_count,
            owner_id: guild.owner_id.get(),
            owner_name: guild
                .members
                .get(&guild.owner_id)
                .map(|member| member.user.name.clone()),
            description: guild.description.clone(),
            icon_url: guild.icon_url(),
            banner_url: guild
                .banner
                .as_ref()
                .map(|hash| asset_url("banners", id, hash)),
            splash_url: guild
                .splash
                .as_ref()
                .map(|hash| asset_url("splashes", id, hash)),
            vanity_url_code: guild.vanity_url_code.clone(),
            premium_tier: u8::from(guild.premium_tier),
            premium_subscription_count: guild.premium_subscription_count,
            preferred_locale: guild.preferred_locale.clone(),
        }
    }
}

fn asset_url(kind: &str, guild_id: u64, hash: impl Display) -> String {
    format!(
        "https://cdn.discordapp.com/{}/{}/{}.png",
        kind, guild_id, hash
    )
}

/// Inbound message as seen by the autoresponder pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub id: u64,
    pub channel_id: u64,
    pub channel_name: Option<String>,
    pub guild: Option<MessageGuild>,
    pub author: MessageAuthor,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl InboundMessage {
    /// Extracts the fields used by the autoresponder pipeline from a Serenity message.
    ///
    /// Guild details and the channel name are not part of the gateway payload; attach them with
    /// [`InboundMessage::with_guild_details`] after a cache lookup.
    pub fn from_message(message: &Message) -> Self {
        let (nick, role_ids) = match message.member.as_deref() {
            Some(member) => (
                member.nick.clone(),
                member.roles.iter().map(|role| role.get()).collect(),
            ),
            None => (None, Vec::new()),
        };

        Self {
            id: message.id.get(),
            channel_id: message.channel_id.get(),
            channel_name: None,
            guild: message.guild_id.map(|guild_id| MessageGuild {
                id: guild_id.get(),
                details: None,
            }),
            author: MessageAuthor {
                id: message.author.id.get(),
                name: message.author.name.clone(),
                global_name: message.author.global_name.clone(),
                nick,
                bot: message.author.bot,
                role_ids,
            },
            content: message.content.clone(),
            created_at: message.timestamp.to_utc(),
        }
    }

    /// Attaches cached guild details and the channel name.
    pub fn with_guild_details(
        mut self,
        details: Option<GuildDetails>,
        channel_name: Option<String>,
    ) -> Self {
        if let Some(guild) = self.guild.as_mut() {
            guild.details = details;
        }
        self.channel_name = channel_name;
        self
    }

    pub fn guild_id(&self) -> Option<u64> {
        self.guild.as_ref().map(|guild| guild.id)
    }
}
