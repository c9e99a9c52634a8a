//! Test factories for creating Serenity API objects.
//!
//! These factories create valid Serenity objects by deserializing JSON, simulating what
//! Discord's gateway would deliver.
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::serenity::create_test_message;
//!
//! #[test]
//! fn test_inbound_message() {
//!     let message = create_test_message(1, 2, Some(3), 4, "hello there", false, &[5]);
//!
//!     // Use in your tests...
//! }
//! ```
//!
//! # Available Factories
//!
//! - `message::create_test_message` - Create Serenity Message objects

pub mod message;

pub use message::create_test_message;
