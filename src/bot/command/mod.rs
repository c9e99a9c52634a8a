//! Chat commands registered with the poise framework.

pub mod autoresponder;
pub mod jinja;

use poise::CreateReply;

use crate::{
    bot::{handler::message::with_cached_details, Context},
    error::AppError,
    model::message::{InboundMessage, MessageAuthor, MessageGuild},
    state::BotState,
};

/// Every command the bot registers.
pub fn commands() -> Vec<poise::Command<BotState, AppError>> {
    vec![autoresponder::autoresponder(), jinja::jinja()]
}

/// Describes the invocation as an inbound message, for building template variables.
///
/// Prefix commands use the invoking message. Slash commands have no message, so one is
/// assembled from the interaction with the invocation string as its content.
pub async fn invocation_message(ctx: Context<'_>) -> InboundMessage {
    let message = match ctx {
        poise::Context::Prefix(prefix) => InboundMessage::from_message(prefix.msg),
        poise::Context::Application(_) => {
            let author = ctx.author();
            let (nick, role_ids) = match ctx.author_member().await {
                Some(member) => (
                    member.nick.clone(),
                    member.roles.iter().map(|role| role.get()).collect(),
                ),
                None => (None, Vec::new()),
            };

            InboundMessage {
                id: ctx.id(),
                channel_id: ctx.channel_id().get(),
                channel_name: None,
                guild: ctx.guild_id().map(|guild_id| MessageGuild {
                    id: guild_id.get(),
                    details: None,
                }),
                author: MessageAuthor {
                    id: author.id.get(),
                    name: author.name.clone(),
                    global_name: author.global_name.clone(),
                    nick,
                    bot: author.bot,
                    role_ids,
                },
                content: ctx.invocation_string(),
                created_at: ctx.created_at().to_utc(),
            }
        }
    };

    with_cached_details(&ctx.serenity_context().cache, message)
}

/// Replies to the invocation with plain text.
pub async fn reply_text(ctx: Context<'_>, text: impl Into<String>) -> Result<(), AppError> {
    ctx.send(CreateReply::default().content(text).reply(true))
        .await?;

    Ok(())
}

/// Replies with the outcome of a management operation.
///
/// Autoresponder errors are meant for the invoking user and are sent as the reply;
/// every other error is passed on to the framework error handler.
pub async fn reply_result(
    ctx: Context<'_>,
    result: Result<String, AppError>,
) -> Result<(), AppError> {
    let text = user_message(result)?;

    reply_text(ctx, text).await
}

/// Turns the outcome of a management operation into the text shown to the user.
///
/// # Returns
/// - `Ok(String)` - Confirmation, or the autoresponder error's message
/// - `Err(AppError)` - Any other error
pub fn user_message(result: Result<String, AppError>) -> Result<String, AppError> {
    match result {
        Ok(text) => Ok(text),
        Err(AppError::AutoResponderErr(error)) => Ok(error.to_string()),
        Err(error) => Err(error),
    }
}

/// Guild of the invocation, for commands registered as guild only.
pub fn require_guild(ctx: Context<'_>) -> Result<u64, AppError> {
    ctx.guild_id()
        .map(|guild_id| guild_id.get())
        .ok_or_else(|| {
            AppError::InternalError("Guild only command invoked outside of a guild".to_string())
        })
}
