use crate::error::Error;
use std::env;

pub const DEFAULT_API_URL: &str = "https://api.kentaa.nl/v1";

/// Runtime configuration for the Kentaa API client.
/// Values are sourced from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Configuration with defaults for everything except the API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: default_user_agent(),
            timeout_secs: 30,
        }
    }

    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - KENTAA_API_KEY [required]
    /// - KENTAA_API_URL (default: https://api.kentaa.nl/v1)
    /// - KENTAA_HTTP_TIMEOUT_SECS (default: 30)
    /// - KENTAA_USER_AGENT (default: kentaa-api/<version>)
    pub fn from_env() -> Result<Self, Error> {
        let api_key = env::var("KENTAA_API_KEY")
            .map_err(|_| Error::Config("missing KENTAA_API_KEY".to_string()))?;

        let api_url = env::var("KENTAA_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let timeout_secs = env::var("KENTAA_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);
        let user_agent = env::var("KENTAA_USER_AGENT").unwrap_or_else(|_| default_user_agent());

        Ok(Self {
            api_key,
            api_url,
            user_agent,
            timeout_secs,
        })
    }
}

fn default_user_agent() -> String {
    format!("kentaa-api/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_defaults() {
        let cfg = Config::new("k");
        assert_eq!(cfg.api_key, "k");
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.timeout_secs, 30);
        assert!(cfg.user_agent.starts_with("kentaa-api/"));
    }
}
