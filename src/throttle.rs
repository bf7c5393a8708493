//! Per-identity send cooldown.
//!
//! One clock per identity, shared by the short-code and reset-link paths so
//! the two together cannot exceed the issuance rate. The cooldown gates
//! issuance only; verifying an already-issued token is never throttled.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

/// Cooldown tracker keyed by identity.
///
/// Entries are overwritten on each issuance and treated as absent once the
/// window elapses; stale entries are pruned opportunistically on marking.
#[derive(Debug)]
pub struct Throttle {
    window: Duration,
    entries: Mutex<HashMap<String, Instant>>,
}

impl Throttle {
    /// Tracker with the default 60 second window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_window(DEFAULT_COOLDOWN)
    }

    #[must_use]
    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Remaining cooldown for the identity, if one is active.
    #[must_use]
    pub fn remaining(&self, identity: &str) -> Option<Duration> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        entries
            .get(identity)
            .filter(|&&until| until > now)
            .map(|&until| until - now)
    }

    /// Start (or restart) the cooldown for the identity.
    pub fn mark_sent(&self, identity: &str) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        entries.retain(|_, &mut until| until > now);
        entries.insert(identity.to_string(), now + self.window);
    }

    /// Atomic check-then-mark: starts the cooldown and returns `Ok` only if
    /// no cooldown was active, otherwise returns the remaining duration.
    ///
    /// Both halves run under one lock so two concurrent requests for the
    /// same identity cannot both pass the check.
    pub fn try_mark(&self, identity: &str) -> Result<(), Duration> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        if let Some(&until) = entries.get(identity) {
            if until > now {
                return Err(until - now);
            }
        }
        entries.retain(|_, &mut until| until > now);
        entries.insert(identity.to_string(), now + self.window);
        Ok(())
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Throttle;
    use std::time::Duration;

    #[test]
    fn second_mark_within_window_is_rejected() {
        let throttle = Throttle::with_window(Duration::from_secs(60));
        assert!(throttle.try_mark("u@example.com").is_ok());

        let remaining = throttle
            .try_mark("u@example.com")
            .expect_err("second mark should be throttled");
        assert!(remaining <= Duration::from_secs(60));
        assert!(remaining > Duration::from_secs(50));
    }

    #[test]
    fn mark_succeeds_again_after_window_elapses() {
        let throttle = Throttle::with_window(Duration::ZERO);
        assert!(throttle.try_mark("u@example.com").is_ok());
        assert!(throttle.try_mark("u@example.com").is_ok());
    }

    #[test]
    fn identities_do_not_share_cooldowns() {
        let throttle = Throttle::with_window(Duration::from_secs(60));
        assert!(throttle.try_mark("a@example.com").is_ok());
        assert!(throttle.try_mark("b@example.com").is_ok());
    }

    #[test]
    fn remaining_reports_active_cooldown_only() {
        let throttle = Throttle::with_window(Duration::from_secs(60));
        assert_eq!(throttle.remaining("u@example.com"), None);

        throttle.mark_sent("u@example.com");
        assert!(throttle.remaining("u@example.com").is_some());

        let expired = Throttle::with_window(Duration::ZERO);
        expired.mark_sent("u@example.com");
        assert_eq!(expired.remaining("u@example.com"), None);
    }
}
