//! Domain models shared between the data, service and bot layers.

pub mod autoresponder;
pub mod guild_config;
pub mod message;
