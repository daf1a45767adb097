use std::env;
use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_url: String,
    pub api_prefix: String,
    /// `None` leaves the HTTP client's default in place
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let request_timeout = lookup("WIKI_REQUEST_TIMEOUT_SECS")
            .map(|secs| {
                secs.parse::<u64>()
                    .context("WIKI_REQUEST_TIMEOUT_SECS must be a whole number of seconds")
            })
            .transpose()?
            .map(Duration::from_secs);

        Ok(Self {
            server_url: lookup("WIKI_SERVER_URL")
                .unwrap_or_else(|| "http://localhost:5000".to_string()),
            api_prefix: lookup("WIKI_API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            request_timeout,
        })
    }
}
