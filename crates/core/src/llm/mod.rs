use crate::config::Settings;
use crate::llm::error::OracleError;
use std::sync::Arc;

pub mod anthropic;
pub mod endpoint;
pub mod error;
pub mod json;
pub mod narrator;
pub mod offline;
pub mod openai;
pub mod prompts;

#[cfg(test)]
pub(crate) mod scripted;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
    Offline,
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Text generation service. Failures come back as values; callers decide how to degrade.
#[async_trait::async_trait]
pub trait NarrativeOracle: Send + Sync {
    fn provider(&self) -> Provider;

    async fn complete(&self, request: CompletionRequest) -> Result<String, OracleError>;
}

/// Picks the configured provider, falling back to [`offline::OfflineOracle`] when no key is set.
pub fn oracle_from_settings(settings: &Settings) -> anyhow::Result<Arc<dyn NarrativeOracle>> {
    let requested = settings
        .llm_provider
        .as_deref()
        .map(|s| s.trim().to_ascii_lowercase());

    match requested.as_deref() {
        Some("offline") => Ok(Arc::new(offline::OfflineOracle)),
        Some("anthropic") => Ok(Arc::new(anthropic::AnthropicClient::from_settings(settings)?)),
        Some("openai") => Ok(Arc::new(openai::OpenAiClient::from_settings(settings)?)),
        Some(other) => anyhow::bail!("unknown LLM_PROVIDER {other:?} (expected anthropic|openai|offline)"),
        None => {
            if settings.anthropic_api_key.is_some() {
                Ok(Arc::new(anthropic::AnthropicClient::from_settings(settings)?))
            } else if settings.openai_api_key.is_some() {
                Ok(Arc::new(openai::OpenAiClient::from_settings(settings)?))
            } else {
                tracing::warn!("no LLM API key configured; narratives will use the offline fallback");
                Ok(Arc::new(offline::OfflineOracle))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            anthropic_api_key: None,
            openai_api_key: None,
            llm_provider: None,
            sentry_dsn: None,
            dataset_path: None,
            summary_repair_attempts: 1,
        }
    }

    #[test]
    fn no_keys_selects_offline() {
        let oracle = oracle_from_settings(&settings()).unwrap();
        assert_eq!(oracle.provider(), Provider::Offline);
    }

    #[test]
    fn explicit_provider_requires_its_key() {
        let mut s = settings();
        s.llm_provider = Some("OpenAI".to_string());
        assert!(oracle_from_settings(&s).is_err());

        s.openai_api_key = Some("sk-test".to_string());
        let oracle = oracle_from_settings(&s).unwrap();
        assert_eq!(oracle.provider(), Provider::OpenAI);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let mut s = settings();
        s.llm_provider = Some("llama".to_string());
        assert!(oracle_from_settings(&s).is_err());
    }
}
