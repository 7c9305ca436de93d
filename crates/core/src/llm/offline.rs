use crate::llm::error::OracleError;
use crate::llm::{CompletionRequest, NarrativeOracle, Provider};

/// Oracle used when no provider is configured. Every call fails, so callers take their
/// deterministic fallbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineOracle;

#[async_trait::async_trait]
impl NarrativeOracle for OfflineOracle {
    fn provider(&self) -> Provider {
        Provider::Offline
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<String, OracleError> {
        Err(OracleError::new(
            Provider::Offline,
            "disabled",
            "no LLM provider configured",
        ))
    }
}
