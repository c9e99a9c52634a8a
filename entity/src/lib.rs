//! SeaORM entity models for the Parrot bot database.

pub mod prelude;

pub mod guild_config;
