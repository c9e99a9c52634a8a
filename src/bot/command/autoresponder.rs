//! The `autoresponder` command group.
//!
//! Thin wrappers around [`AutoResponderService`]: each subcommand resolves the guild,
//! calls one service operation and replies with its outcome.

use poise::CreateReply;
use serenity::all::{Colour, CreateEmbed, CreateEmbedFooter, GuildChannel, Role};

use crate::{
    bot::{
        command::{invocation_message, reply_result, reply_text, require_guild, user_message},
        Context,
    },
    error::{autoresponder::AutoResponderError, AppError},
    model::autoresponder::AutoResponder,
    service::{
        autoresponder::{manage::AutoResponderService, tutorial},
        variables::{build_variables, variable_paths},
    },
};

const EMBED_COLOUR: Colour = Colour::BLITZ_BLUE;

/// Longest embed description Discord accepts.
const MAX_DESCRIPTION_LENGTH: usize = 4096;

fn service<'a>(ctx: Context<'a>) -> AutoResponderService<'a> {
    let data = ctx.data();
    AutoResponderService::new(&data.store, &data.guild_configs, &data.executor)
}

/// Manage the autoresponders of this server.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    aliases("ar"),
    required_permissions = "MANAGE_GUILD",
    default_member_permissions = "MANAGE_GUILD",
    subcommand_required,
    subcommands(
        "add", "remove", "list", "edit", "info", "enable", "disable", "ignore", "tutorial",
        "variables"
    )
)]
pub async fn autoresponder(_ctx: Context<'_>) -> Result<(), AppError> {
    Ok(())
}

/// Add an autoresponder.
///
/// The name is a case-insensitive pattern that has to match the whole message. The
/// response is a Jinja template.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    aliases("create", "set")
)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Trigger, longer than 5 characters"] name: String,
    #[description = "Response template"]
    #[rest]
    response: Option<String>,
) -> Result<(), AppError> {
    let Some(_guard) = ctx.data().locks.try_lock(ctx.author().id.get()) else {
        tracing::debug!("Skipped concurrent `add` by {}", ctx.author().id);
        return Ok(());
    };
    let guild_id = require_guild(ctx)?;
    let variables = build_variables(&invocation_message(ctx).await);

    let result = service(ctx)
        .add(
            guild_id,
            &name,
            response.as_deref().unwrap_or_default(),
            variables,
        )
        .await;

    reply_result(ctx, result).await
}

/// Remove an autoresponder.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    aliases("delete", "del", "rm")
)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Name of the autoresponder"] name: String,
) -> Result<(), AppError> {
    let guild_id = require_guild(ctx)?;

    reply_result(ctx, service(ctx).remove(guild_id, &name)).await
}

/// List the autoresponders of this server.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    aliases("ls", "all")
)]
pub async fn list(ctx: Context<'_>) -> Result<(), AppError> {
    let guild_id = require_guild(ctx)?;
    let names = service(ctx).list(guild_id);

    if names.is_empty() {
        return reply_text(ctx, "There are no autoresponders.").await;
    }

    let embed = CreateEmbed::new()
        .title("Autoresponders")
        .description(list_description(&names))
        .colour(EMBED_COLOUR);
    ctx.send(CreateReply::default().embed(embed).reply(true))
        .await?;

    Ok(())
}

/// Edit the response of an autoresponder.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    aliases("change", "modify")
)]
pub async fn edit(
    ctx: Context<'_>,
    #[description = "Name of the autoresponder"] name: String,
    #[description = "New response template"]
    #[rest]
    response: String,
) -> Result<(), AppError> {
    let guild_id = require_guild(ctx)?;

    reply_result(ctx, service(ctx).edit(guild_id, &name, &response)).await
}

/// Show the response and settings of an autoresponder.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    aliases("show")
)]
pub async fn info(
    ctx: Context<'_>,
    #[description = "Name of the autoresponder"] name: String,
) -> Result<(), AppError> {
    let guild_id = require_guild(ctx)?;

    let autoresponder = match service(ctx).info(guild_id, &name) {
        Ok(autoresponder) => autoresponder,
        Err(AppError::AutoResponderErr(error)) => return reply_text(ctx, error.to_string()).await,
        Err(error) => return Err(error),
    };

    ctx.send(
        CreateReply::default()
            .embed(info_embed(&name, &autoresponder))
            .reply(true),
    )
    .await?;

    Ok(())
}

/// Enable an autoresponder.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    aliases("on", "boot", "enabled", "start")
)]
pub async fn enable(
    ctx: Context<'_>,
    #[description = "Name of the autoresponder"] name: String,
) -> Result<(), AppError> {
    let guild_id = require_guild(ctx)?;

    reply_result(ctx, service(ctx).enable(guild_id, &name)).await
}

/// Disable an autoresponder without removing it.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    aliases("off", "shutdown", "disabled", "mute", "stop")
)]
pub async fn disable(
    ctx: Context<'_>,
    #[description = "Name of the autoresponder"] name: String,
) -> Result<(), AppError> {
    let guild_id = require_guild(ctx)?;

    reply_result(ctx, service(ctx).disable(guild_id, &name)).await
}

/// Stop an autoresponder from firing for a role or in a channel.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD"
)]
pub async fn ignore(
    ctx: Context<'_>,
    #[description = "Name of the autoresponder"] name: String,
    #[description = "Role whose members are ignored"] role: Option<Role>,
    #[description = "Channel in which the autoresponder never fires"] channel: Option<GuildChannel>,
) -> Result<(), AppError> {
    let guild_id = require_guild(ctx)?;

    if role.is_none() && channel.is_none() {
        return reply_text(ctx, AutoResponderError::MissingIgnoreTarget.to_string()).await;
    }

    let service = service(ctx);
    let mut lines = Vec::new();
    if let Some(role) = role {
        lines.push(user_message(service.ignore_role(
            guild_id,
            &name,
            role.id.get(),
            &role.name,
        ))?);
    }
    if let Some(channel) = channel {
        lines.push(user_message(service.ignore_channel(
            guild_id,
            &name,
            channel.id.get(),
            &channel.name,
        ))?);
    }

    reply_text(ctx, lines.join("\n")).await
}

/// Learn how autoresponders and their templates work.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD"
)]
pub async fn tutorial(
    ctx: Context<'_>,
    #[description = "Template construct, e.g. `if` or `filters`"]
    #[rest]
    topic: Option<String>,
) -> Result<(), AppError> {
    let embed = match topic.as_deref().map(str::trim).filter(|topic| !topic.is_empty()) {
        None => tutorial_embed(),
        Some(query) => match tutorial::find_topic(query) {
            Some((name, text)) => CreateEmbed::new()
                .title(name)
                .description(text)
                .colour(EMBED_COLOUR),
            None => {
                return reply_text(ctx, format!("No tutorial found for that entity {}.", query))
                    .await;
            }
        },
    };

    ctx.send(CreateReply::default().embed(embed).reply(true))
        .await?;

    Ok(())
}

/// List the variables available to response templates.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    aliases("vars", "var")
)]
pub async fn variables(ctx: Context<'_>) -> Result<(), AppError> {
    let variables = build_variables(&invocation_message(ctx).await);
    let paths: Vec<String> = variable_paths(&variables)
        .into_iter()
        .map(|path| format!("`{{{{ {} }}}}`", path))
        .collect();

    let embed = CreateEmbed::new()
        .title("Variables")
        .description(paths.join("\n"))
        .colour(EMBED_COLOUR);
    ctx.send(CreateReply::default().embed(embed).reply(true))
        .await?;

    Ok(())
}

/// Lists names one per line, cut off with a count of the remaining names once the embed
/// description limit is reached.
fn list_description(names: &[String]) -> String {
    let mut description = String::new();

    for (index, name) in names.iter().enumerate() {
        let line = format!("`{}`\n", name);
        let remaining = names.len() - index;
        let suffix = format!("...and {} more", remaining);

        if description.chars().count() + line.chars().count() + suffix.chars().count()
            > MAX_DESCRIPTION_LENGTH
        {
            description.push_str(&suffix);
            return description;
        }

        description.push_str(&line);
    }

    description.trim_end().to_string()
}

fn info_embed(name: &str, autoresponder: &AutoResponder) -> CreateEmbed {
    let roles = mention_list(&autoresponder.ignore_role, |id| format!("<@&{}>", id));
    let channels = mention_list(&autoresponder.ignore_channel, |id| format!("<#{}>", id));

    CreateEmbed::new()
        .title(name)
        .description(&autoresponder.response)
        .field(
            "Enabled",
            if autoresponder.enabled { "Yes" } else { "No" },
            true,
        )
        .field("Ignored roles", roles, true)
        .field("Ignored channels", channels, true)
        .colour(EMBED_COLOUR)
}

fn mention_list(ids: &[u64], mention: impl Fn(u64) -> String) -> String {
    if ids.is_empty() {
        return "None".to_string();
    }

    ids.iter().map(|id| mention(*id)).collect::<Vec<_>>().join(" ")
}

fn tutorial_embed() -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(tutorial::TUTORIAL_TITLE)
        .description(tutorial::TUTORIAL_DESCRIPTION)
        .footer(CreateEmbedFooter::new(tutorial::topics_footer()))
        .colour(EMBED_COLOUR);

    for (name, value) in tutorial::TUTORIAL_FIELDS {
        embed = embed.field(name, value, false);
    }

    embed
}
