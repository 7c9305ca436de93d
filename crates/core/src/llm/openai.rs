use crate::config::Settings;
use crate::llm::endpoint::EndpointOptions;
use crate::llm::error::OracleError;
use crate::llm::{CompletionRequest, NarrativeOracle, Provider};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: EndpointOptions,
}

impl OpenAiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_openai_api_key()?.to_string();
        let endpoint = EndpointOptions::from_env("OPENAI", DEFAULT_BASE_URL, DEFAULT_MODEL);
        let http = endpoint.http_client()?;
        Ok(Self {
            http,
            api_key,
            endpoint,
        })
    }

    fn build_request(&self, request: CompletionRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt,
        });

        ChatRequest {
            model: self.endpoint.model.clone(),
            max_tokens: self.endpoint.max_tokens,
            messages,
        }
    }

    fn first_choice_text(res: ChatResponse) -> Option<String> {
        res.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|s| !s.trim().is_empty())
    }
}

#[async_trait::async_trait]
impl NarrativeOracle for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, OracleError> {
        let url = self.endpoint.url("/v1/chat/completions");
        let body = self.build_request(request);

        let res = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::from_reqwest(Provider::OpenAI, e))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| OracleError::from_reqwest(Provider::OpenAI, e))?;
        if !status.is_success() {
            let stage = if status.as_u16() == 429 { "rate_limited" } else { "http" };
            return Err(
                OracleError::new(Provider::OpenAI, stage, format!("status={status}"))
                    .with_raw_output(text),
            );
        }

        let parsed = serde_json::from_str::<ChatResponse>(&text).map_err(|e| {
            OracleError::new(
                Provider::OpenAI,
                "decode",
                format!("failed to decode chat completion: {e}"),
            )
            .with_raw_output(text.clone())
        })?;

        Self::first_choice_text(parsed).ok_or_else(|| {
            OracleError::new(Provider::OpenAI, "empty", "no message content in first choice")
                .with_raw_output(text)
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
