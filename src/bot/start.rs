use serenity::all::{Client, GatewayIntents};

use crate::{
    bot::{command, error::on_error, handler::Handler},
    config::Config,
    error::AppError,
    state::BotState,
};

/// Builds the Discord client with the command framework and event handler attached.
///
/// Commands are registered globally once the framework is ready.
///
/// # Arguments
/// - `config` - Application configuration with the bot token and owners
/// - `state` - Shared bot state handed to the event handler and every command
///
/// # Returns
/// - `Ok(Client)` - Client ready to be started
/// - `Err(AppError)` - Failed to build the client
pub async fn init_bot(config: &Config, state: BotState) -> Result<Client, AppError> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let framework_state = state.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: command::commands(),
            prefix_options: poise::PrefixFrameworkOptions {
                dynamic_prefix: Some(|ctx| Box::pin(guild_prefix(ctx))),
                mention_as_prefix: true,
                ..Default::default()
            },
            owners: config.owner_ids.iter().copied().collect(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!(
                    "Registered {} application command(s)",
                    framework.options().commands.len()
                );
                Ok(framework_state)
            })
        })
        .build();

    let client = Client::builder(&config.discord_bot_token, intents)
        .framework(framework)
        .event_handler(Handler::new(state))
        .await?;

    Ok(client)
}

/// Resolves the prefix of the guild a message was sent in.
async fn guild_prefix(
    ctx: poise::PartialContext<'_, BotState, AppError>,
) -> Result<Option<String>, AppError> {
    Ok(Some(ctx.data.prefix(ctx.guild_id.map(|id| id.get()))))
}

/// Starts the Discord bot in a blocking manner
///
/// This function should be called from within a tokio::spawn task since it will block
/// until the bot shuts down.
///
/// # Arguments
/// - `client` - Client built by [`init_bot`]
///
/// # Returns
/// - `Ok(())` if the bot runs and shuts down cleanly
/// - `Err(AppError)` if the gateway connection fails
pub async fn start_bot(mut client: Client) -> Result<(), AppError> {
    tracing::info!("Starting Discord bot...");

    client.start().await?;

    Ok(())
}
