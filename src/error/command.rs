//! Classification of command framework errors.
//!
//! The framework reports failures as a wide enum carrying the invocation context. This
//! module reduces that to a small tagged [`CommandErrorKind`] which a single formatter,
//! [`CommandErrorKind::embed_parts`], turns into the title and description of the error
//! embed shown to the user. Variants that are not worth showing (framework setup, event
//! handler failures, unknown commands) classify to `None` and are only logged.

use std::time::Duration;

use serenity::all::Permissions;

use crate::bot::FrameworkError;

const QUESTION_MARK: &str = "\u{2753}";

#[derive(Debug, Clone, PartialEq)]
pub enum CommandErrorKind {
    /// The invoking user lacks one or more required permissions.
    MissingUserPermissions(Vec<String>),
    /// The bot itself lacks one or more required permissions.
    MissingBotPermissions(Vec<String>),
    /// Command was invoked outside of a guild.
    GuildOnly,
    /// Command is restricted to bot owners.
    OwnerOnly,
    /// Command is on cooldown for this invoker.
    Cooldown(Duration),
    /// An argument could not be parsed.
    ArgumentParse {
        input: Option<String>,
        message: String,
    },
    /// A custom check rejected the invocation.
    CheckFailed,
    /// The command body returned an error or panicked.
    Internal(String),
}

impl CommandErrorKind {
    /// Classifies a framework error, returning `None` for errors that have no user-facing
    /// representation.
    pub fn from_framework_error(error: &FrameworkError<'_>) -> Option<Self> {
        use poise::FrameworkError as E;

        let kind = match error {
            E::MissingUserPermissions {
                missing_permissions,
                ..
            } => Self::MissingUserPermissions(
                (*missing_permissions)
                    .map(permission_names)
                    .unwrap_or_default(),
            ),
            E::MissingBotPermissions {
                missing_permissions,
                ..
            } => Self::MissingBotPermissions(permission_names(*missing_permissions)),
            E::GuildOnly { .. } => Self::GuildOnly,
            E::NotAnOwner { .. } => Self::OwnerOnly,
            E::CooldownHit {
                remaining_cooldown,
                ..
            } => Self::Cooldown(*remaining_cooldown),
            E::ArgumentParse { error, input, .. } => Self::ArgumentParse {
                input: input.clone(),
                message: error.to_string(),
            },
            E::CommandStructureMismatch { description, .. } => Self::ArgumentParse {
                input: None,
                message: description.to_string(),
            },
            E::CommandCheckFailed { .. } => Self::CheckFailed,
            E::Command { error, .. } => Self::Internal(error.to_string()),
            E::CommandPanic { payload, .. } => Self::Internal(
                payload
                    .clone()
                    .unwrap_or_else(|| "command panicked".to_string()),
            ),
            _ => return None,
        };

        Some(kind)
    }

    /// Formats the error into an embed `(title, description)` pair.
    pub fn embed_parts(&self) -> (String, String) {
        let (title, description) = match self {
            Self::MissingUserPermissions(missing) => (
                "Missing permissions",
                format!(
                    "You need the following permission(s) to the run the command.```\n{}```",
                    missing.join("\n")
                ),
            ),
            Self::MissingBotPermissions(missing) => (
                "Bot Missing permissions",
                format!(
                    "Please provide the following permission(s) to the bot.```\n{}```",
                    missing.join("\n")
                ),
            ),
            Self::GuildOnly => (
                "Guild Only",
                "This command can only be used inside a server.".to_string(),
            ),
            Self::OwnerOnly => (
                "Owner Only",
                "This command is restricted to the owners of the bot.".to_string(),
            ),
            Self::Cooldown(remaining) => (
                "Command On Cooldown",
                format!(
                    "You are on command cooldown, please retry in **{:.1}s**",
                    remaining.as_secs_f64()
                ),
            ),
            Self::ArgumentParse { input, message } => (
                "Bad Argument",
                match input {
                    Some(input) => format!("Could not understand `{}`: {}", input, message),
                    None => message.clone(),
                },
            ),
            Self::CheckFailed => (
                "Unexpected Error",
                "You don't have the required permissions to use this command.".to_string(),
            ),
            Self::Internal(_) => (
                "Unexpected Error",
                "Something went wrong while running this command.".to_string(),
            ),
        };

        (
            format!("{} {} {}", QUESTION_MARK, title, QUESTION_MARK),
            description,
        )
    }
}

/// Human readable permission names, with Discord's API wording ("Guild") replaced by the
/// client wording ("Server").
fn permission_names(permissions: Permissions) -> Vec<String> {
    permissions
        .get_permission_names()
        .into_iter()
        .map(|name| name.replace("Guild", "Server"))
        .collect()
}
