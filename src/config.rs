use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default backend URL
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Default session identifier
pub const DEFAULT_SESSION_ID: &str = "wa-bot-ai";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
const DEFAULT_INIT_REFRESH_DELAY_MS: u64 = 2000;
const DEFAULT_STATS_INTERVAL_SECS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_MONITOR_CAPACITY: usize = 200;

/// Dashboard configuration, built once and handed to every client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    /// Backend base URL, without trailing slash
    pub api_url: String,
    /// Fixed WhatsApp session the backend tracks
    pub session_id: String,
    pub poll_interval_secs: u64,
    /// Wait before re-polling after an init command
    pub init_refresh_delay_ms: u64,
    pub stats_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub monitor_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_id: DEFAULT_SESSION_ID.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            init_refresh_delay_ms: DEFAULT_INIT_REFRESH_DELAY_MS,
            stats_interval_secs: DEFAULT_STATS_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            monitor_capacity: DEFAULT_MONITOR_CAPACITY,
        }
    }
}

impl DashboardConfig {
    pub fn new(api_url: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            session_id: session_id.into(),
            ..Default::default()
        }
        .normalized()
    }

    /// Read `WA_API_URL`, `WA_SESSION_ID`, `WA_POLL_INTERVAL_SECS` and
    /// `WA_REQUEST_TIMEOUT_SECS`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            api_url: non_empty("WA_API_URL").unwrap_or(defaults.api_url),
            session_id: non_empty("WA_SESSION_ID").unwrap_or(defaults.session_id),
            poll_interval_secs: non_empty("WA_POLL_INTERVAL_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.poll_interval_secs),
            request_timeout_secs: non_empty("WA_REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.request_timeout_secs),
            ..defaults
        }
        .normalized()
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_secs = interval.as_secs().max(1);
        self
    }

    pub fn with_init_refresh_delay(mut self, delay: Duration) -> Self {
        self.init_refresh_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn normalized(mut self) -> Self {
        while self.api_url.ends_with('/') {
            self.api_url.pop();
        }
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn init_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.init_refresh_delay_ms)
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.api_url, "http://localhost:3001");
        assert_eq!(config.session_id, "wa-bot-ai");
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.init_refresh_delay(), Duration::from_secs(2));
        assert_eq!(config.stats_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("WA_API_URL", "http://bot.internal:8080/"),
            ("WA_SESSION_ID", "shop-bot"),
            ("WA_POLL_INTERVAL_SECS", "5"),
        ]);
        let config = DashboardConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_url, "http://bot.internal:8080");
        assert_eq!(config.session_id, "shop-bot");
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.request_timeout_secs, 15);
    }

    #[test]
    fn test_from_lookup_ignores_blank_and_garbage() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("WA_API_URL", "  "),
            ("WA_POLL_INTERVAL_SECS", "soon"),
            ("WA_REQUEST_TIMEOUT_SECS", "0"),
        ]);
        let config = DashboardConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config, DashboardConfig::default());
    }
}
