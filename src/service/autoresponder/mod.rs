//! Autoresponders: guild rules that answer messages matching a trigger with a template.
//!
//! - [`store`] holds the in-memory autoresponders of every guild
//! - [`dispatch`] evaluates inbound messages against them
//! - [`manage`] implements the management commands
//! - [`tutorial`] holds the help texts of the `tutorial` command

pub mod dispatch;
pub mod manage;
pub mod store;
pub mod tutorial;
