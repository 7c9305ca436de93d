use anyhow::Context;
use std::time::Duration;

const DEFAULT_MAX_TOKENS: u32 = 2048;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for one HTTP provider, read from `<PREFIX>_BASE_URL`, `<PREFIX>_MODEL`,
/// `<PREFIX>_MAX_TOKENS` and `<PREFIX>_TIMEOUT_SECS`.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointOptions {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl EndpointOptions {
    pub fn from_env(prefix: &str, default_base_url: &str, default_model: &str) -> Self {
        Self::from_lookup(prefix, default_base_url, default_model, |key| {
            std::env::var(key).ok()
        })
    }

    pub fn from_lookup(
        prefix: &str,
        default_base_url: &str,
        default_model: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let var = |name: &str| {
            lookup(&format!("{prefix}_{name}"))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            base_url: var("BASE_URL").unwrap_or_else(|| default_base_url.to_string()),
            model: var("MODEL").unwrap_or_else(|| default_model.to_string()),
            max_tokens: var("MAX_TOKENS")
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(DEFAULT_MAX_TOKENS),
            timeout: Duration::from_secs(
                var("TIMEOUT_SECS")
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("failed to build reqwest client")
    }
}
