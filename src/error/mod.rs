//! Error types for the bot runtime and its command surface.
//!
//! `AppError` is the top-level error returned by startup code, repositories, services and
//! command functions. Domain errors such as `ConfigError` and `AutoResponderError` live in
//! their own modules and convert into it. Framework errors raised while dispatching a
//! command are classified separately by [`command::CommandErrorKind`].

pub mod autoresponder;
pub mod command;
pub mod config;

use thiserror::Error;

use crate::error::{autoresponder::AutoResponderError, config::ConfigError};

/// Top-level application error type.
///
/// Most variants use `#[from]` for automatic conversion so `?` can be used across the
/// data, service and command layers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Autoresponder management error that should be shown to the invoking user.
    #[error(transparent)]
    AutoResponderErr(#[from] AutoResponderError),

    /// Database operation error from SeaORM.
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),

    /// Stored JSON document could not be decoded or encoded.
    #[error(transparent)]
    SerdeErr(#[from] serde_json::Error),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Cron scheduler error.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// Logging subscriber could not be installed.
    #[error("Failed to initialise logging: {0}")]
    LoggingErr(String),

    /// Internal error with custom message.
    ///
    /// Logged in full, reported to users as a generic failure.
    #[error("{0}")]
    InternalError(String),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}
