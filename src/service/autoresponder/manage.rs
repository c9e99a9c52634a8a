//! Management operations behind the `autoresponder` command group.
//!
//! Every operation first makes sure the guild is cached, seeding it from the guild
//! configuration snapshot when needed, and then works on the cache only. Changes reach
//! the database with the next periodic flush.

use crate::{
    error::{
        autoresponder::{AutoResponderError, MIN_NAME_LENGTH},
        AppError,
    },
    model::autoresponder::{AutoResponder, GuildAutoResponders},
    service::{
        autoresponder::store::AutoResponderStore,
        guild_config::GuildConfigCache,
        template::{ExecutionOrigin, TemplateExecutor},
        variables::Variables,
    },
};

pub struct AutoResponderService<'a> {
    store: &'a AutoResponderStore,
    guild_configs: &'a GuildConfigCache,
    executor: &'a TemplateExecutor,
}

impl<'a> AutoResponderService<'a> {
    pub fn new(
        store: &'a AutoResponderStore,
        guild_configs: &'a GuildConfigCache,
        executor: &'a TemplateExecutor,
    ) -> Self {
        Self {
            store,
            guild_configs,
            executor,
        }
    }

    /// Caches the guild's autoresponders if they are not cached yet.
    ///
    /// The seed comes from the guild configuration snapshot, or an empty map if the guild
    /// has no snapshot or no stored autoresponders.
    pub fn ensure_guild(&self, guild_id: u64) {
        self.store.ensure_guild(guild_id, || {
            self.guild_configs
                .autoresponders(guild_id)
                .unwrap_or_default()
        });
    }

    /// Adds an enabled autoresponder after test-rendering its response.
    ///
    /// # Arguments
    /// - `guild_id` - Guild the autoresponder belongs to
    /// - `name` - Trigger name, longer than five characters
    /// - `response` - Template source of the response
    /// - `variables` - Variables of the invoking message, used for the test render
    ///
    /// # Returns
    /// - `Ok(String)` - Confirmation message
    /// - `Err(AppError::AutoResponderErr)` - Short or duplicate name, missing response or a
    ///   response that failed to render
    pub async fn add(
        &self,
        guild_id: u64,
        name: &str,
        response: &str,
        variables: Variables,
    ) -> Result<String, AppError> {
        self.ensure_guild(guild_id);

        if name.chars().count() <= MIN_NAME_LENGTH {
            return Err(AutoResponderError::NameTooShort.into());
        }

        if self.exists(guild_id, name) {
            return Err(AutoResponderError::AlreadyExists.into());
        }

        if response.trim().is_empty() {
            return Err(AutoResponderError::MissingResponse.into());
        }

        let rendered = self
            .executor
            .execute(name, response, variables, ExecutionOrigin::Command)
            .await;
        if rendered.is_error {
            return Err(AutoResponderError::InvalidTemplate {
                name: name.to_string(),
                reason: rendered.content,
            }
            .into());
        }

        self.modify(guild_id, |autoresponders| {
            if autoresponders.contains_key(name) {
                return Err(AutoResponderError::AlreadyExists);
            }
            autoresponders.insert(name.to_string(), AutoResponder::new(response));
            Ok(())
        })?;

        tracing::info!("Added autoresponder `{}` in guild {}", name, guild_id);

        Ok(format!("Added autoresponder `{}`.", name))
    }

    pub fn remove(&self, guild_id: u64, name: &str) -> Result<String, AppError> {
        self.ensure_guild(guild_id);

        self.modify(guild_id, |autoresponders| {
            autoresponders
                .shift_remove(name)
                .map(|_| ())
                .ok_or(AutoResponderError::NotFound)
        })?;

        tracing::info!("Removed autoresponder `{}` from guild {}", name, guild_id);

        Ok(format!("Removed autoresponder `{}`.", name))
    }

    /// Names of the guild's autoresponders in insertion order.
    pub fn list(&self, guild_id: u64) -> Vec<String> {
        self.ensure_guild(guild_id);

        self.store
            .snapshot(guild_id)
            .map(|autoresponders| autoresponders.into_keys().collect())
            .unwrap_or_default()
    }

    /// Replaces the response of an autoresponder, keeping its state and ignore lists.
    pub fn edit(&self, guild_id: u64, name: &str, response: &str) -> Result<String, AppError> {
        self.ensure_guild(guild_id);

        self.modify(guild_id, |autoresponders| {
            let autoresponder = autoresponders
                .get_mut(name)
                .ok_or(AutoResponderError::NotFound)?;
            if response.trim().is_empty() {
                return Err(AutoResponderError::MissingResponse);
            }
            autoresponder.response = response.to_string();
            Ok(())
        })?;

        Ok(format!("Edited autoresponder `{}`.", name))
    }

    pub fn info(&self, guild_id: u64, name: &str) -> Result<AutoResponder, AppError> {
        self.ensure_guild(guild_id);

        self.store
            .snapshot(guild_id)
            .and_then(|mut autoresponders| autoresponders.shift_remove(name))
            .ok_or_else(|| AutoResponderError::NotFound.into())
    }

    pub fn enable(&self, guild_id: u64, name: &str) -> Result<String, AppError> {
        self.set_enabled(guild_id, name, true)?;

        Ok(format!("Enabled autoresponder `{}`.", name))
    }

    pub fn disable(&self, guild_id: u64, name: &str) -> Result<String, AppError> {
        self.set_enabled(guild_id, name, false)?;

        Ok(format!("Disabled autoresponder `{}`.", name))
    }

    /// Stops members with a role from triggering an autoresponder.
    ///
    /// # Arguments
    /// - `guild_id` - Guild the autoresponder belongs to
    /// - `name` - Trigger name
    /// - `role_id` - Role to ignore
    /// - `role_name` - Role name used in the confirmation message
    pub fn ignore_role(
        &self,
        guild_id: u64,
        name: &str,
        role_id: u64,
        role_name: &str,
    ) -> Result<String, AppError> {
        self.ensure_guild(guild_id);

        self.modify(guild_id, |autoresponders| {
            let autoresponder = autoresponders
                .get_mut(name)
                .ok_or(AutoResponderError::NotFound)?;
            if autoresponder.ignore_role.contains(&role_id) {
                return Err(AutoResponderError::RoleAlreadyIgnored);
            }
            autoresponder.ignore_role.push(role_id);
            Ok(())
        })?;

        Ok(format!(
            "Ignored role `{}` from autoresponder `{}`.",
            role_name, name
        ))
    }

    /// Stops an autoresponder from firing in a channel.
    pub fn ignore_channel(
        &self,
        guild_id: u64,
        name: &str,
        channel_id: u64,
        channel_name: &str,
    ) -> Result<String, AppError> {
        self.ensure_guild(guild_id);

        self.modify(guild_id, |autoresponders| {
            let autoresponder = autoresponders
                .get_mut(name)
                .ok_or(AutoResponderError::NotFound)?;
            if autoresponder.ignore_channel.contains(&channel_id) {
                return Err(AutoResponderError::ChannelAlreadyIgnored);
            }
            autoresponder.ignore_channel.push(channel_id);
            Ok(())
        })?;

        Ok(format!(
            "Ignored channel `{}` from autoresponder `{}`.",
            channel_name, name
        ))
    }

    fn set_enabled(&self, guild_id: u64, name: &str, enabled: bool) -> Result<(), AppError> {
        self.ensure_guild(guild_id);

        self.modify(guild_id, |autoresponders| {
            let autoresponder = autoresponders
                .get_mut(name)
                .ok_or(AutoResponderError::NotFound)?;
            if autoresponder.enabled == enabled {
                return Err(if enabled {
                    AutoResponderError::AlreadyEnabled
                } else {
                    AutoResponderError::AlreadyDisabled
                });
            }
            autoresponder.enabled = enabled;
            Ok(())
        })
    }

    fn exists(&self, guild_id: u64, name: &str) -> bool {
        self.store
            .with_guild(guild_id, |autoresponders| autoresponders.contains_key(name))
            .unwrap_or(false)
    }

    fn modify(
        &self,
        guild_id: u64,
        f: impl FnOnce(&mut GuildAutoResponders) -> Result<(), AutoResponderError>,
    ) -> Result<(), AppError> {
        match self.store.with_guild(guild_id, f) {
            Some(result) => Ok(result?),
            None => Err(AppError::InternalError(format!(
                "Autoresponders of guild {} are not cached",
                guild_id
            ))),
        }
    }
}
