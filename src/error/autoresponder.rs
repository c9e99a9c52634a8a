//! User-facing failures of autoresponder management commands.
//!
//! Every variant's `Display` text is sent back to the invoking user as-is, so the
//! messages are written for Discord rather than for logs.

use thiserror::Error;

/// Minimum trigger-name length is exclusive: names must be *longer* than this.
pub const MIN_NAME_LENGTH: usize = 5;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutoResponderError {
    #[error("The name of the autoresponder must be longer than 5 characters.")]
    NameTooShort,

    #[error("An autoresponder with that name already exists.")]
    AlreadyExists,

    #[error("An autoresponder with that name does not exist.")]
    NotFound,

    #[error("You must provide a response.")]
    MissingResponse,

    /// The response failed its test render when the autoresponder was added.
    #[error("Failed to add autoresponder `{name}`.\n\n`{reason}`")]
    InvalidTemplate { name: String, reason: String },

    #[error("That autoresponder is already enabled.")]
    AlreadyEnabled,

    #[error("That autoresponder is already disabled.")]
    AlreadyDisabled,

    #[error("That role is already ignored.")]
    RoleAlreadyIgnored,

    #[error("That channel is already ignored.")]
    ChannelAlreadyIgnored,

    #[error("You must provide a role or a channel to ignore.")]
    MissingIgnoreTarget,
}
