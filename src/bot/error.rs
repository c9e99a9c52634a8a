//! Framework error handler.
//!
//! Errors that classify to a [`CommandErrorKind`] are answered with an error embed in the
//! invoking channel. Everything else is logged, and framework level errors without an
//! invocation context fall through to poise's default handler.

use poise::CreateReply;
use serenity::all::{Colour, CreateEmbed};

use crate::{bot::FrameworkError, error::command::CommandErrorKind};

/// Colour of error embeds.
const ERROR_COLOUR: Colour = Colour::RED;

/// Handles an error raised while dispatching a command or event.
pub async fn on_error(error: FrameworkError<'_>) {
    let Some(kind) = CommandErrorKind::from_framework_error(&error) else {
        if let Err(e) = poise::builtins::on_error(error).await {
            tracing::error!("Error while handling framework error: {}", e);
        }
        return;
    };

    if let CommandErrorKind::Internal(detail) = &kind {
        tracing::error!("Command failed: {}", detail);
    }

    let Some(ctx) = error.ctx() else {
        return;
    };

    let (title, description) = kind.embed_parts();
    let embed = CreateEmbed::new()
        .title(title)
        .description(description)
        .colour(ERROR_COLOUR);

    if let Err(e) = ctx
        .send(CreateReply::default().embed(embed).reply(true))
        .await
    {
        tracing::error!(
            "Failed to send error for command `{}`: {}",
            ctx.command().qualified_name,
            e
        );
    }
}
