use serenity::all::UserId;

use crate::{
    error::{config::ConfigError, AppError},
    model::guild_config::DEFAULT_PREFIX,
};

pub struct Config {
    pub database_url: String,

    pub discord_bot_token: String,

    /// Prefix for guilds without a stored configuration.
    pub default_prefix: String,
    /// Users allowed to run owner-only features such as `jinja` with variables.
    pub owner_ids: Vec<UserId>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?,
            discord_bot_token: std::env::var("DISCORD_BOT_TOKEN")
                .map_err(|_| ConfigError::MissingEnvVar("DISCORD_BOT_TOKEN".to_string()))?,
            default_prefix: std::env::var("BOT_PREFIX")
                .ok()
                .filter(|prefix| !prefix.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            owner_ids: match std::env::var("OWNER_IDS") {
                Ok(value) => parse_owner_ids(&value)?,
                Err(_) => Vec::new(),
            },
        })
    }
}

/// Parses a comma separated list of user IDs, ignoring empty entries.
fn parse_owner_ids(value: &str) -> Result<Vec<UserId>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| match id.parse::<u64>() {
            Ok(id) if id != 0 => Ok(UserId::new(id)),
            _ => Err(ConfigError::InvalidEnvVar {
                name: "OWNER_IDS".to_string(),
                reason: format!("`{}` is not a user ID", id),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_owner_ids() {
        let owners = parse_owner_ids("123, 456,,789 ").unwrap();

        assert_eq!(
            owners,
            vec![UserId::new(123), UserId::new(456), UserId::new(789)]
        );
    }

    #[test]
    fn rejects_malformed_owner_ids() {
        let error = parse_owner_ids("123,abc").unwrap_err();

        assert!(matches!(
            error,
            ConfigError::InvalidEnvVar { ref name, .. } if name == "OWNER_IDS"
        ));
        assert!(error.to_string().contains("`abc`"));
    }

    #[test]
    fn zero_is_not_a_user_id() {
        assert!(parse_owner_ids("0").is_err());
    }
}
