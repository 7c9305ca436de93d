use crate::llm::Provider;
use std::fmt;

const RAW_OUTPUT_EXCERPT_CHARS: usize = 500;

/// Why a model call produced no usable text.
#[derive(Debug, Clone)]
pub struct OracleError {
    pub provider: Provider,
    pub stage: &'static str,
    pub detail: String,
    pub raw_output: Option<String>,
}

impl OracleError {
    pub fn new(provider: Provider, stage: &'static str, detail: impl Into<String>) -> Self {
        Self {
            provider,
            stage,
            detail: detail.into(),
            raw_output: None,
        }
    }

    pub fn with_raw_output(mut self, raw_output: String) -> Self {
        self.raw_output = Some(raw_output);
        self
    }

    /// Leading slice of the provider's raw body, cut on a char boundary.
    pub fn raw_output_excerpt(&self) -> Option<&str> {
        let raw = self.raw_output.as_deref()?;
        Some(match raw.char_indices().nth(RAW_OUTPUT_EXCERPT_CHARS) {
            Some((end, _)) => &raw[..end],
            None => raw,
        })
    }

    pub fn from_reqwest(provider: Provider, err: reqwest::Error) -> Self {
        let stage = if err.is_timeout() { "timeout" } else { "transport" };
        Self::new(provider, stage, err.to_string())
    }
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LLM error (provider={:?}, stage={}): {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for OracleError {}
