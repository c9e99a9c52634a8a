//! Evaluation of inbound messages against a guild's autoresponders.

use std::sync::Arc;

use dashmap::DashMap;
use regex::{Regex, RegexBuilder};

use crate::{
    error::autoresponder::MIN_NAME_LENGTH,
    model::message::InboundMessage,
    service::{
        autoresponder::store::AutoResponderStore,
        ratelimit::AutoResponderRateLimiter,
        template::{ExecutionOrigin, TemplateExecutor},
        variables::build_variables,
    },
};

/// Upper bound on the compiled size of a trigger pattern.
const TRIGGER_SIZE_LIMIT: usize = 1 << 20;

/// Compiled triggers kept before the cache is reset.
const MAX_CACHED_TRIGGERS: usize = 1024;

/// Compiles a trigger name into a whole-content, case-insensitive pattern.
///
/// The name is validated on its own before it is anchored, so a name that is only valid
/// once wrapped, such as `hello)|(?:x`, is treated as a literal.
///
/// # Returns
/// - `Some(Regex)` - Anchored pattern
/// - `None` - The name is not a valid pattern and is compared literally
fn compile_trigger(name: &str) -> Option<Regex> {
    let build = |pattern: &str| {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .size_limit(TRIGGER_SIZE_LIMIT)
            .build()
    };

    build(name).ok()?;
    build(&format!(r"\A(?:{})\z", name)).ok()
}

/// Shared cache of compiled trigger patterns keyed by trigger name.
///
/// Names that do not compile are cached too, as a literal fallback. Once the cache holds
/// [`MAX_CACHED_TRIGGERS`] names it is cleared and refilled on demand.
#[derive(Clone, Default)]
pub struct TriggerCache {
    patterns: Arc<DashMap<String, Option<Regex>>>,
}

impl TriggerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `content` matches the trigger `name`.
    ///
    /// The name is a case-insensitive regular expression that must match the whole
    /// content. Names that are not valid patterns are compared literally and
    /// case-sensitively.
    pub fn matches(&self, name: &str, content: &str) -> bool {
        let cached = self.patterns.get(name).map(|entry| entry.value().clone());
        let pattern = match cached {
            Some(pattern) => pattern,
            None => {
                let compiled = compile_trigger(name);
                if self.patterns.len() >= MAX_CACHED_TRIGGERS {
                    self.patterns.clear();
                }
                self.patterns.insert(name.to_string(), compiled.clone());
                compiled
            }
        };

        match pattern {
            Some(pattern) => pattern.is_match(content),
            None => name == content,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.patterns.len()
    }
}

/// Whether a rendered response should be sent at all.
///
/// Empty output and a bare `none` are treated as "no response".
pub fn should_send(content: &str) -> bool {
    !content.is_empty() && content.to_lowercase().trim_matches(' ') != "none"
}

/// Matches messages against cached autoresponders and renders their responses.
pub struct AutoResponderDispatcher<'a> {
    store: &'a AutoResponderStore,
    limiter: &'a AutoResponderRateLimiter,
    executor: &'a TemplateExecutor,
    triggers: &'a TriggerCache,
}

impl<'a> AutoResponderDispatcher<'a> {
    pub fn new(
        store: &'a AutoResponderStore,
        limiter: &'a AutoResponderRateLimiter,
        executor: &'a TemplateExecutor,
        triggers: &'a TriggerCache,
    ) -> Self {
        Self {
            store,
            limiter,
            executor,
            triggers,
        }
    }

    /// Whether a message is eligible for autoresponses at all.
    ///
    /// Direct messages, messages from bots and guilds without autoresponders are skipped
    /// before any variables are built.
    pub fn should_process(&self, message: &InboundMessage) -> bool {
        match message.guild_id() {
            Some(guild_id) => !message.author.bot && self.store.has_autoresponders(guild_id),
            None => false,
        }
    }

    /// Evaluates a message against every autoresponder of its guild, in insertion order.
    ///
    /// Each enabled autoresponder that applies to the channel and author takes a rate limit
    /// token before its trigger is matched. Once the channel is rate limited no further
    /// autoresponders are evaluated for this message.
    ///
    /// # Arguments
    /// - `message` - Inbound message, with cached guild and channel details attached
    ///
    /// # Returns
    /// - `Vec<String>` - Responses to send, in order; diagnostics of failed renders included
    pub async fn dispatch(&self, message: &InboundMessage) -> Vec<String> {
        if !self.should_process(message) {
            return Vec::new();
        }
        let Some(autoresponders) = message
            .guild_id()
            .and_then(|guild_id| self.store.snapshot(guild_id))
        else {
            return Vec::new();
        };

        let variables = build_variables(message);
        let mut responses = Vec::new();

        for (name, autoresponder) in &autoresponders {
            if !autoresponder.enabled || name.chars().count() <= MIN_NAME_LENGTH {
                continue;
            }

            if autoresponder.ignores_channel(message.channel_id) {
                continue;
            }

            if autoresponder.ignores_any_role(&message.author.role_ids) {
                continue;
            }

            if self
                .limiter
                .is_ratelimited(message.channel_id, message.created_at)
            {
                tracing::debug!(
                    "Autoresponses rate limited in channel {}",
                    message.channel_id
                );
                break;
            }

            if !self.triggers.matches(name, &message.content) {
                continue;
            }

            let rendered = self
                .executor
                .execute(
                    name,
                    &autoresponder.response,
                    variables.clone(),
                    ExecutionOrigin::AutoResponder,
                )
                .await;

            if rendered.is_error {
                tracing::debug!("Autoresponder `{}` failed: {}", name, rendered.content);
            }

            if should_send(&rendered.content) {
                responses.push(rendered.content);
            }
        }

        responses
    }
}
