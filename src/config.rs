//! Configuration types.

use std::time::Duration;

/// Default HTTP port for the quest API.
pub const DEFAULT_PORT: u16 = 8080;

/// Default cap on concurrently live sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Runtime configuration for the quest service.
#[derive(Debug, Clone)]
pub struct QuestConfig {
    /// Port the HTTP/WebSocket server binds to.
    pub port: u16,
    /// How long the interstitial between two steps stays on screen.
    pub interstitial_dwell: Duration,
    /// How long the "generating report" screen is shown before results.
    pub loading_dwell: Duration,
    /// How long the compliance advisory stays visible.
    pub advisory_ttl: Duration,
    /// Sessions untouched for this long are pruned.
    pub session_idle_timeout: Duration,
    /// How often the prune task runs.
    pub prune_interval: Duration,
    /// Session creation is refused once this many are live.
    pub max_sessions: usize,
    /// Allowed CORS origin. `None` allows any origin.
    pub allowed_origin: Option<String>,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            interstitial_dwell: Duration::from_millis(4500),
            loading_dwell: Duration::from_millis(2500),
            advisory_ttl: Duration::from_millis(5000),
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
            prune_interval: Duration::from_secs(60),
            max_sessions: DEFAULT_MAX_SESSIONS,
            allowed_origin: None,
        }
    }
}

impl QuestConfig {
    /// Build config from environment variables, falling back to defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port: u16 = std::env::var("QUEST_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let allowed_origin = std::env::var("QUEST_ALLOWED_ORIGIN")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && s != "*");

        Self {
            port,
            interstitial_dwell: env_millis("QUEST_INTERSTITIAL_MS")
                .unwrap_or(defaults.interstitial_dwell),
            loading_dwell: env_millis("QUEST_LOADING_MS").unwrap_or(defaults.loading_dwell),
            advisory_ttl: env_millis("QUEST_ADVISORY_MS").unwrap_or(defaults.advisory_ttl),
            session_idle_timeout: env_secs("QUEST_SESSION_IDLE_SECS")
                .unwrap_or(defaults.session_idle_timeout),
            prune_interval: env_secs("QUEST_PRUNE_INTERVAL_SECS")
                .filter(|d| !d.is_zero())
                .unwrap_or(defaults.prune_interval),
            max_sessions: std::env::var("QUEST_MAX_SESSIONS")
                .ok()
                .and_then(|s| s.trim().parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_sessions),
            allowed_origin,
        }
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}

fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
