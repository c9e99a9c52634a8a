//! Per-channel rate limiting of autoresponses.
//!
//! Each channel gets a fixed-window bucket of tokens. Buckets are driven by the message
//! creation timestamp rather than the wall clock so that replays and tests are
//! deterministic.

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;

/// Autoresponses allowed per channel within one window.
pub const AUTORESPONSE_RATE: u32 = 3;

/// Length of one rate limit window, in seconds.
pub const AUTORESPONSE_PER_SECONDS: i64 = 10;

/// Fixed-window token bucket.
///
/// The window starts with the first token taken after a refill. Once it has fully
/// elapsed the bucket refills to `rate` tokens. Updating an empty bucket reports the
/// remaining wait without consuming anything.
#[derive(Debug, Clone)]
pub struct Cooldown {
    rate: u32,
    per: TimeDelta,
    tokens: u32,
    window: Option<DateTime<Utc>>,
    last: Option<DateTime<Utc>>,
}

impl Cooldown {
    pub fn new(rate: u32, per: TimeDelta) -> Self {
        Self {
            rate,
            per,
            tokens: rate,
            window: None,
            last: None,
        }
    }

    /// Tokens available at `now`, after applying any pending refill.
    pub fn tokens(&self, now: DateTime<Utc>) -> u32 {
        match self.window {
            Some(window) if now <= window + self.per => self.tokens,
            _ => self.rate,
        }
    }

    /// Takes a token.
    ///
    /// # Returns
    /// - `None` - A token was available and has been consumed
    /// - `Some(retry_after)` - The bucket is empty until the window ends
    pub fn update(&mut self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.last = Some(now);
        self.tokens = self.tokens(now);

        if self.tokens == self.rate {
            self.window = Some(now);
        }

        if self.tokens == 0 {
            let window = self.window.unwrap_or(now);
            return Some(self.per - (now - window));
        }

        self.tokens -= 1;
        None
    }

    /// Whether the bucket has been idle for longer than a full window.
    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.last.map_or(true, |last| now > last + self.per)
    }
}

/// Cooldown buckets keyed by channel ID.
#[derive(Debug)]
pub struct CooldownMapping {
    rate: u32,
    per: TimeDelta,
    buckets: DashMap<u64, Cooldown>,
}

impl CooldownMapping {
    pub fn new(rate: u32, per: TimeDelta) -> Self {
        Self {
            rate,
            per,
            buckets: DashMap::new(),
        }
    }

    /// Takes a token from the bucket of `key`, creating it if needed.
    ///
    /// Buckets idle for longer than a window are dropped first so the map only holds
    /// channels that are currently active.
    ///
    /// # Returns
    /// - `true` if the bucket was already empty
    pub fn update(&self, key: u64, now: DateTime<Utc>) -> bool {
        self.buckets.retain(|_, bucket| !bucket.is_stale(now));

        self.buckets
            .entry(key)
            .or_insert_with(|| Cooldown::new(self.rate, self.per))
            .update(now)
            .is_some()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.buckets.len()
    }
}

/// Gate deciding whether an autoresponse may be sent in a channel.
///
/// Holds a primary bucket and an "exceeded" bucket per channel, both with the same
/// limits. The exceeded bucket is consulted first; the primary bucket only sees the
/// messages the exceeded bucket lets through.
#[derive(Debug)]
pub struct AutoResponderRateLimiter {
    primary: CooldownMapping,
    exceeded: CooldownMapping,
}

impl Default for AutoResponderRateLimiter {
    fn default() -> Self {
        Self::new(AUTORESPONSE_RATE, TimeDelta::seconds(AUTORESPONSE_PER_SECONDS))
    }
}

impl AutoResponderRateLimiter {
    pub fn new(rate: u32, per: TimeDelta) -> Self {
        Self {
            primary: CooldownMapping::new(rate, per),
            exceeded: CooldownMapping::new(rate, per),
        }
    }

    /// Takes a token for `channel_id` and reports whether the channel is rate limited.
    ///
    /// # Arguments
    /// - `channel_id` - Channel the autoresponse would be sent to
    /// - `at` - Creation time of the triggering message
    pub fn is_ratelimited(&self, channel_id: u64, at: DateTime<Utc>) -> bool {
        if self.exceeded.update(channel_id, at) {
            return true;
        }

        self.primary.update(channel_id, at)
    }
}
