//! Template variables exposed to autoresponder responses and the `jinja` command.
//!
//! Every inbound message is flattened into a handful of plain serializable structs so that
//! templates can walk them with attribute access, e.g. `{{ message.author.id }}` or
//! `{{ guild.name }}`.

use std::collections::BTreeMap;

use minijinja::{value::ValueKind, Value};
use serde::Serialize;

use crate::model::message::{InboundMessage, MessageAuthor, MessageGuild};

/// Variable name to value mapping handed to the template executor.
pub type Variables = BTreeMap<String, Value>;

#[derive(Debug, Clone, Serialize)]
struct AuthorVariable {
    id: String,
    name: String,
    global_name: Option<String>,
    nick: Option<String>,
    display_name: String,
    mention: String,
    bot: bool,
    roles: Vec<String>,
}

impl AuthorVariable {
    fn new(author: &MessageAuthor) -> Self {
        Self {
            id: author.id.to_string(),
            name: author.name.clone(),
            global_name: author.global_name.clone(),
            nick: author.nick.clone(),
            display_name: author.display_name().to_string(),
            mention: format!("<@{}>", author.id),
            bot: author.bot,
            roles: author.role_ids.iter().map(|id| id.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChannelVariable {
    id: String,
    name: Option<String>,
    mention: String,
}

#[derive(Debug, Clone, Serialize)]
struct OwnerVariable {
    id: String,
    name: Option<String>,
    mention: String,
}

/// Guild fields; everything but `id` is none when the guild is not cached.
#[derive(Debug, Clone, Serialize)]
struct GuildVariable {
    id: String,
    name: Option<String>,
    member_count: Option<u64>,
    owner: Option<OwnerVariable>,
    description: Option<String>,
    icon_url: Option<String>,
    banner_url: Option<String>,
    splash_url: Option<String>,
    vanity_url: Option<String>,
    premium_tier: Option<u8>,
    premium_subscription_count: Option<u64>,
    preferred_locale: Option<String>,
}

impl GuildVariable {
    fn new(guild: &MessageGuild) -> Self {
        let details = guild.details.as_ref();

        Self {
            id: guild.id.to_string(),
            name: details.map(|details| details.name.clone()),
            member_count: details.map(|details| details.member_count),
            owner: details.map(|details| OwnerVariable {
                id: details.owner_id.to_string(),
                name: details.owner_name.clone(),
                mention: format!("<@{}>", details.owner_id),
            }),
            description: details.and_then(|details| details.description.clone()),
            icon_url: details.and_then(|details| details.icon_url.clone()),
            banner_url: details.and_then(|details| details.banner_url.clone()),
            splash_url: details.and_then(|details| details.splash_url.clone()),
            vanity_url: details.and_then(|details| details.vanity_url_code.clone()),
            premium_tier: details.map(|details| details.premium_tier),
            premium_subscription_count: details
                .and_then(|details| details.premium_subscription_count),
            preferred_locale: details.map(|details| details.preferred_locale.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct MessageVariable {
    id: String,
    content: String,
    created_at: String,
    jump_url: String,
    author: AuthorVariable,
    channel: ChannelVariable,
    guild: Option<GuildVariable>,
}

/// Builds the template variables for a message.
///
/// Snowflakes are exposed as strings so that templates never lose precision when they
/// compare or concatenate them.
///
/// # Arguments
/// - `message` - Message the variables describe
///
/// # Returns
/// - `Variables` - Mapping with the `author`, `channel`, `guild` and `message` entries
pub fn build_variables(message: &InboundMessage) -> Variables {
    let author = AuthorVariable::new(&message.author);
    let channel = ChannelVariable {
        id: message.channel_id.to_string(),
        name: message.channel_name.clone(),
        mention: format!("<#{}>", message.channel_id),
    };
    let guild = message.guild.as_ref().map(GuildVariable::new);
    let jump_url = format!(
        "https://discord.com/channels/{}/{}/{}",
        message
            .guild_id()
            .map_or_else(|| "@me".to_string(), |id| id.to_string()),
        message.channel_id,
        message.id
    );

    let message_variable = MessageVariable {
        id: message.id.to_string(),
        content: message.content.clone(),
        created_at: message.created_at.to_rfc3339(),
        jump_url,
        author: author.clone(),
        channel: channel.clone(),
        guild: guild.clone(),
    };

    let mut variables = Variables::new();
    variables.insert("author".to_string(), Value::from_serialize(&author));
    variables.insert("channel".to_string(), Value::from_serialize(&channel));
    variables.insert("guild".to_string(), Value::from_serialize(&guild));
    variables.insert(
        "message".to_string(),
        Value::from_serialize(&message_variable),
    );
    variables
}

/// Dotted paths of every leaf variable, e.g. `message.author.id`.
pub fn variable_paths(variables: &Variables) -> Vec<String> {
    let mut paths = Vec::new();
    for (name, value) in variables {
        collect_paths(name.clone(), value, &mut paths);
    }
    paths
}

fn collect_paths(path: String, value: &Value, paths: &mut Vec<String>) {
    if value.kind() == ValueKind::Map {
        if let Ok(keys) = value.try_iter() {
            for key in keys {
                if let (Some(name), Ok(child)) = (key.as_str(), value.get_item(&key)) {
                    collect_paths(format!("{}.{}", path, name), &child, paths);
                }
            }
            return;
        }
    }
    paths.push(path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::message::GuildDetails;
    use test_utils::serenity::create_test_message;

    fn inbound(guild_id: Option<u64>) -> InboundMessage {
        let message = create_test_message(10, 20, guild_id, 30, "hello there", false, &[40]);
        let details = GuildDetails {
            name: "Parrot HQ".to_string(),
            member_count: 42,
            owner_id: 50,
            owner_name: Some("polly".to_string()),
            premium_tier: 2,
            preferred_locale: "en-US".to_string(),
            ..Default::default()
        };
        InboundMessage::from_message(&message)
            .with_guild_details(Some(details), Some("general".to_string()))
    }

    #[test]
    fn exposes_top_level_entries() {
        let variables = build_variables(&inbound(Some(1)));

        let names: Vec<&str> = variables.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["author", "channel", "guild", "message"]);
    }

    #[test]
    fn nests_author_and_guild_under_message() {
        let variables = build_variables(&inbound(Some(1)));
        let message = &variables["message"];

        let author_id = message
            .get_attr("author")
            .and_then(|author| author.get_attr("id"))
            .unwrap();
        let guild_name = message
            .get_attr("guild")
            .and_then(|guild| guild.get_attr("name"))
            .unwrap();

        assert_eq!(author_id.as_str(), Some("30"));
        assert_eq!(guild_name.as_str(), Some("Parrot HQ"));
    }

    #[test]
    fn author_mention_uses_user_snowflake() {
        let variables = build_variables(&inbound(Some(1)));

        let mention = variables["author"].get_attr("mention").unwrap();

        assert_eq!(mention.as_str(), Some("<@30>"));
    }

    #[test]
    fn direct_messages_have_no_guild() {
        let variables = build_variables(&inbound(None));

        assert!(variables["guild"].is_none());
        let jump_url = variables["message"].get_attr("jump_url").unwrap();
        assert_eq!(
            jump_url.as_str(),
            Some("https://discord.com/channels/@me/20/10")
        );
    }

    #[test]
    fn lists_leaf_paths() {
        let paths = variable_paths(&build_variables(&inbound(Some(1))));

        assert!(paths.contains(&"message.author.id".to_string()));
        assert!(paths.contains(&"channel.mention".to_string()));
        assert!(paths.contains(&"guild.member_count".to_string()));
        assert!(paths.contains(&"guild.owner.mention".to_string()));
        assert!(paths.contains(&"guild.premium_tier".to_string()));
        assert!(!paths.contains(&"message".to_string()));
    }

    #[test]
    fn exposes_cached_guild_details() {
        let variables = build_variables(&inbound(Some(1)));
        let guild = &variables["guild"];

        let owner_mention = guild
            .get_attr("owner")
            .and_then(|owner| owner.get_attr("mention"))
            .unwrap();
        assert_eq!(owner_mention.as_str(), Some("<@50>"));
        assert_eq!(guild.get_attr("member_count").unwrap().as_i64(), Some(42));
        assert_eq!(guild.get_attr("premium_tier").unwrap().as_i64(), Some(2));
        assert_eq!(
            guild.get_attr("preferred_locale").unwrap().as_str(),
            Some("en-US")
        );
        assert!(guild.get_attr("banner_url").unwrap().is_none());
    }

    #[test]
    fn uncached_guilds_expose_only_their_id() {
        let message = create_test_message(10, 20, Some(1), 30, "hello there", false, &[]);
        let variables = build_variables(&InboundMessage::from_message(&message));
        let guild = &variables["guild"];

        assert_eq!(guild.get_attr("id").unwrap().as_str(), Some("1"));
        assert!(guild.get_attr("name").unwrap().is_none());
        assert!(guild.get_attr("owner").unwrap().is_none());
    }
}
