//! Discord gateway client and command framework.
//!
//! Gateway events are handled by [`handler::Handler`], which caches guild configuration
//! and feeds guild messages to the autoresponder dispatcher. Commands are registered with
//! the poise framework as both prefix and slash commands; the prefix is resolved per guild
//! from the guild configuration cache.
//!
//! # Gateway Intents
//!
//! The bot requires the following gateway intents:
//! - `GUILDS` - Receive guild availability events and populate the cache
//! - `GUILD_MESSAGES` - Receive messages sent in guild channels
//! - `MESSAGE_CONTENT` - Read message content for triggers and prefix commands (privileged intent)
//!
//! Note: `MESSAGE_CONTENT` is a privileged intent and must be explicitly enabled in the
//! Discord Developer Portal for the bot application.

pub mod command;
pub mod error;
pub mod handler;
pub mod start;

use crate::{error::AppError, state::BotState};

/// Invocation context passed to every command.
pub type Context<'a> = poise::Context<'a, BotState, AppError>;

/// Error reported by the command framework.
pub type FrameworkError<'a> = poise::FrameworkError<'a, BotState, AppError>;
