use crate::error::{PortalError, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How long a decoded session token is trusted before the server is asked again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPolicy {
    /// Trust the cached decode until logout.
    #[default]
    TrustDecoded,
    /// Re-check the session once the last check is older than the interval.
    RecheckAfter(Duration),
    /// Re-check whenever a request comes back with 401.
    RecheckOnUnauthorized,
}

impl SessionPolicy {
    /// Parse `trust`, `recheck:<secs>` or `recheck-on-401`.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        match raw {
            "" | "trust" => Ok(SessionPolicy::TrustDecoded),
            "recheck-on-401" => Ok(SessionPolicy::RecheckOnUnauthorized),
            other => {
                let secs = other
                    .strip_prefix("recheck:")
                    .and_then(|s| s.parse::<u64>().ok())
                    .ok_or_else(|| {
                        PortalError::Config(format!("unknown session policy '{}'", other))
                    })?;
                Ok(SessionPolicy::RecheckAfter(Duration::from_secs(secs)))
            }
        }
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Base URL of the REST API, without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Directory for persisted tokens; in-memory when unset
    pub token_dir: Option<PathBuf>,
    pub session_policy: SessionPolicy,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token_dir: None,
            session_policy: SessionPolicy::default(),
        }
    }
}

impl PortalConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Load configuration from the environment, honouring a `.env` file.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config =
            Self::new(lookup("PORTAL_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()));

        if let Some(raw) = lookup("PORTAL_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                PortalError::Config(format!("PORTAL_TIMEOUT_SECS is not a number: '{}'", raw))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        config.token_dir = lookup("PORTAL_TOKEN_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        if let Some(raw) = lookup("PORTAL_SESSION_POLICY") {
            config.session_policy = SessionPolicy::parse(&raw)?;
        }

        Ok(config)
    }

    pub fn with_session_policy(mut self, policy: SessionPolicy) -> Self {
        self.session_policy = policy;
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PortalConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.token_dir.is_none());
        assert_eq!(config.session_policy, SessionPolicy::TrustDecoded);
    }

    #[test]
    fn test_env_overrides() {
        let config = PortalConfig::from_lookup(lookup(&[
            ("PORTAL_API_URL", "https://api.example.com/"),
            ("PORTAL_TIMEOUT_SECS", "5"),
            ("PORTAL_TOKEN_DIR", "/tmp/tokens"),
            ("PORTAL_SESSION_POLICY", "recheck:60"),
        ]))
        .unwrap();

        assert_eq!(config.url("/api/rentals"), "https://api.example.com/api/rentals");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.token_dir, Some(PathBuf::from("/tmp/tokens")));
        assert_eq!(
            config.session_policy,
            SessionPolicy::RecheckAfter(Duration::from_secs(60))
        );
    }

    #[test]
    fn test_bad_values_are_rejected() {
        assert!(PortalConfig::from_lookup(lookup(&[("PORTAL_TIMEOUT_SECS", "soon")])).is_err());
        assert!(SessionPolicy::parse("sometimes").is_err());
        assert_eq!(
            SessionPolicy::parse("recheck-on-401").unwrap(),
            SessionPolicy::RecheckOnUnauthorized
        );
    }
}
