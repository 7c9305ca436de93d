use crate::config::Settings;
use crate::llm::endpoint::EndpointOptions;
use crate::llm::error::OracleError;
use crate::llm::{CompletionRequest, NarrativeOracle, Provider};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: EndpointOptions,
}

impl AnthropicClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_anthropic_api_key()?.to_string();
        let endpoint = EndpointOptions::from_env("ANTHROPIC", DEFAULT_BASE_URL, DEFAULT_MODEL);
        let http = endpoint.http_client()?;
        Ok(Self {
            http,
            api_key,
            endpoint,
        })
    }

    async fn create_message(
        &self,
        req: &CreateMessageRequest,
    ) -> Result<CreateMessageResponse, OracleError> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&self.api_key)
            .map_err(|e| OracleError::new(Provider::Anthropic, "config", e.to_string()))?;
        headers.insert("x-api-key", api_key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let url = self.endpoint.url("/v1/messages");
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(req)
            .send()
            .await
            .map_err(|e| OracleError::from_reqwest(Provider::Anthropic, e))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| OracleError::from_reqwest(Provider::Anthropic, e))?;
        if !status.is_success() {
            return Err(
                OracleError::new(Provider::Anthropic, "http", format!("status={status}"))
                    .with_raw_output(text),
            );
        }

        serde_json::from_str::<CreateMessageResponse>(&text).map_err(|e| {
            OracleError::new(
                Provider::Anthropic,
                "decode",
                format!("failed to decode Anthropic response: {e}"),
            )
            .with_raw_output(text)
        })
    }

    fn response_text(res: &CreateMessageResponse) -> String {
        let mut out = String::new();
        for block in &res.content {
            match block {
                ContentBlock::Text { text } => {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(text);
                }
                ContentBlock::Thinking { .. }
                | ContentBlock::RedactedThinking { .. }
                | ContentBlock::Unknown => {}
            }
        }
        out
    }
}

#[async_trait::async_trait]
impl NarrativeOracle for AnthropicClient {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, OracleError> {
        let make_req = |max_tokens: u32| CreateMessageRequest {
            model: self.endpoint.model.clone(),
            max_tokens,
            system: request.system.clone(),
            messages: vec![Message {
                role: "user",
                content: request.prompt.clone(),
            }],
        };

        let mut res = self.create_message(&make_req(self.endpoint.max_tokens)).await?;

        // If the model hit max_tokens, retry once with a higher ceiling.
        if matches!(res.stop_reason.as_deref(), Some("max_tokens")) {
            let bumped = self.endpoint.max_tokens.saturating_mul(2).max(4096);
            tracing::warn!(
                from = self.endpoint.max_tokens,
                to = bumped,
                "Anthropic stop_reason=max_tokens; retrying once with higher max_tokens"
            );
            res = self.create_message(&make_req(bumped)).await?;
        }

        let text = Self::response_text(&res);
        if text.trim().is_empty() {
            return Err(OracleError::new(
                Provider::Anthropic,
                "empty",
                "response contained no text blocks",
            ));
        }
        Ok(text)
    }
}

#[derive(Debug, Clone, Serialize)]
struct CreateMessageRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlock>,

    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "thinking")]
    Thinking {
        #[serde(default)]
        thinking: String,
    },

    #[serde(rename = "redacted_thinking")]
    RedactedThinking {
        #[serde(default)]
        data: String,
    },

    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn joins_text_blocks_and_skips_others() {
        let res: CreateMessageResponse = serde_json::from_value(json!({
            "content": [
                {"type": "thinking", "thinking": "hmm", "signature": "sig"},
                {"type": "text", "text": "Revenue rose 20%."},
                {"type": "tool_use", "id": "toolu_1", "name": "x", "input": {}},
                {"type": "text", "text": "Costs held steady."},
            ],
            "stop_reason": "end_turn",
        }))
        .unwrap();

        assert_eq!(
            AnthropicClient::response_text(&res),
            "Revenue rose 20%.\nCosts held steady."
        );
        assert_eq!(res.stop_reason.as_deref(), Some("end_turn"));
    }

    #[test]
    fn request_omits_missing_system_prompt() {
        let req = CreateMessageRequest {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 16,
            system: None,
            messages: vec![Message {
                role: "user",
                content: "hi".to_string(),
            }],
        };
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("system").is_none());
        assert_eq!(v["messages"][0]["role"], "user");
    }
}
