//! Flow configuration.

use std::time::Duration;

const DEFAULT_SHORT_CODE_TTL_SECONDS: u64 = 10 * 60;
const DEFAULT_LINK_TTL_SECONDS: u64 = 10 * 60;
const DEFAULT_COOLDOWN_SECONDS: u64 = 60;

/// Tunables for a [`RecoveryFlow`](crate::flow::RecoveryFlow).
///
/// Defaults: 10 minute TTL for both proof shapes, 60 second send cooldown.
#[derive(Clone, Debug)]
pub struct RecoveryConfig {
    reset_url_base: String,
    short_code_ttl: Duration,
    link_ttl: Duration,
    cooldown: Duration,
}

impl RecoveryConfig {
    /// `reset_url_base` is the public page the emailed deep link points at;
    /// the link key is appended as the final path segment.
    #[must_use]
    pub fn new(reset_url_base: String) -> Self {
        Self {
            reset_url_base,
            short_code_ttl: Duration::from_secs(DEFAULT_SHORT_CODE_TTL_SECONDS),
            link_ttl: Duration::from_secs(DEFAULT_LINK_TTL_SECONDS),
            cooldown: Duration::from_secs(DEFAULT_COOLDOWN_SECONDS),
        }
    }

    #[must_use]
    pub fn with_short_code_ttl(mut self, ttl: Duration) -> Self {
        self.short_code_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_link_ttl(mut self, ttl: Duration) -> Self {
        self.link_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    #[must_use]
    pub fn short_code_ttl(&self) -> Duration {
        self.short_code_ttl
    }

    #[must_use]
    pub fn link_ttl(&self) -> Duration {
        self.link_ttl
    }

    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Build the deep link included in recovery mail.
    #[must_use]
    pub fn build_reset_url(&self, key: &str) -> String {
        let base = self.reset_url_base.trim_end_matches('/');
        format!("{base}/{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::RecoveryConfig;
    use std::time::Duration;

    #[test]
    fn defaults_and_overrides() {
        let config = RecoveryConfig::new("https://id.example.com/reset".to_string());
        assert_eq!(config.short_code_ttl(), Duration::from_secs(600));
        assert_eq!(config.link_ttl(), Duration::from_secs(600));
        assert_eq!(config.cooldown(), Duration::from_secs(60));

        let config = config
            .with_short_code_ttl(Duration::from_secs(120))
            .with_link_ttl(Duration::from_secs(300))
            .with_cooldown(Duration::from_secs(30));
        assert_eq!(config.short_code_ttl(), Duration::from_secs(120));
        assert_eq!(config.link_ttl(), Duration::from_secs(300));
        assert_eq!(config.cooldown(), Duration::from_secs(30));
    }

    #[test]
    fn build_reset_url_trims_trailing_slash() {
        let config = RecoveryConfig::new("https://id.example.com/reset/".to_string());
        assert_eq!(
            config.build_reset_url("abc123"),
            "https://id.example.com/reset/abc123"
        );
    }
}
