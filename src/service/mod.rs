pub mod autoresponder;
pub mod guild_config;
pub mod lock;
pub mod ratelimit;
pub mod template;
pub mod variables;
