//! Test factory for creating Serenity Message objects.

use serenity::all::Message;

/// Timestamp used for every factory message.
pub const TEST_MESSAGE_TIMESTAMP: &str = "2024-01-01T12:00:00.000000+00:00";

/// Creates a test Serenity Message with customizable fields.
///
/// Guild messages carry a partial member with the given role IDs, matching what the
/// gateway sends for `MESSAGE_CREATE` in a guild. Direct messages carry no member.
///
/// # Arguments
/// - `message_id` - Discord message ID (snowflake)
/// - `channel_id` - Channel the message was sent in
/// - `guild_id` - Guild the message was sent in, `None` for direct messages
/// - `author_id` - Author user ID
/// - `content` - Message content
/// - `bot` - Whether the author is a bot account
/// - `role_ids` - Role IDs of the author, ignored for direct messages
///
/// # Returns
/// - `Message` - A valid Serenity Message struct for testing
///
/// # Panics
/// - If the JSON cannot be deserialized into a Message (indicates invalid test data)
pub fn create_test_message(
    message_id: u64,
    channel_id: u64,
    guild_id: Option<u64>,
    author_id: u64,
    content: &str,
    bot: bool,
    role_ids: &[u64],
) -> Message {
    let member = guild_id.map(|_| {
        serde_json::json!({
            "roles": role_ids.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
            "nick": null,
            "avatar": null,
            "joined_at": TEST_MESSAGE_TIMESTAMP,
            "premium_since": null,
            "deaf": false,
            "mute": false,
            "pending": false,
            "flags": 0,
        })
    });

    serde_json::from_value(serde_json::json!({
        "id": message_id.to_string(),
        "channel_id": channel_id.to_string(),
        "guild_id": guild_id.map(|id| id.to_string()),
        "author": {
            "id": author_id.to_string(),
            "username": format!("user{}", author_id),
            "discriminator": "0",
            "global_name": null,
            "avatar": null,
            "bot": bot,
            "public_flags": 0,
        },
        "member": member,
        "content": content,
        "timestamp": TEST_MESSAGE_TIMESTAMP,
        "edited_timestamp": null,
        "tts": false,
        "mention_everyone": false,
        "mentions": [],
        "mention_roles": [],
        "attachments": [],
        "embeds": [],
        "pinned": false,
        "type": 0,
        "flags": 0,
        "components": [],
        "sticker_items": [],
    }))
    .expect("Failed to create test message")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_guild_message_with_member_roles() {
        let message = create_test_message(1, 2, Some(3), 4, "hello there", false, &[5, 6]);

        assert_eq!(message.id.get(), 1);
        assert_eq!(message.channel_id.get(), 2);
        assert_eq!(message.guild_id.map(|id| id.get()), Some(3));
        assert_eq!(message.author.id.get(), 4);
        assert_eq!(message.content, "hello there");

        let member = message.member.as_deref().unwrap();
        let roles: Vec<u64> = member.roles.iter().map(|role| role.get()).collect();
        assert_eq!(roles, vec![5, 6]);
    }

    #[test]
    fn creates_direct_message_without_member() {
        let message = create_test_message(1, 2, None, 4, "hi", true, &[5]);

        assert!(message.guild_id.is_none());
        assert!(message.member.is_none());
        assert!(message.author.bot);
    }
}
