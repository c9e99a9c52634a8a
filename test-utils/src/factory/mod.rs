//! Factory methods for creating test data.
//!
//! Each entity has its own factory module with both a `Factory` struct for customization
//! and a `create_*` convenience function for quick default creation.
//!
//! # Basic Usage
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), sea_orm::DbErr> {
//!     let db = /* ... */;
//!
//!     let config = factory::create_guild_config(&db).await?;
//!
//!     let with_autoresponders = factory::guild_config::GuildConfigFactory::new(&db)
//!         .guild_id(123)
//!         .autoresponder(serde_json::json!({ "hello there": { "enabled": true, "response": "hi" } }))
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod guild_config;
pub mod helpers;

pub use guild_config::create_guild_config;
