use crate::llm::error::OracleError;
use crate::llm::{CompletionRequest, NarrativeOracle, Provider};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays canned responses in order and records every prompt it was sent.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    responses: Mutex<VecDeque<Result<String, OracleError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new(responses: Vec<Result<String, OracleError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failure(stage: &'static str) -> Result<String, OracleError> {
        Err(OracleError::new(Provider::Offline, stage, "scripted failure"))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl NarrativeOracle for ScriptedOracle {
    fn provider(&self) -> Provider {
        Provider::Offline
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, OracleError> {
        self.prompts.lock().unwrap().push(request.prompt);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Self::failure("exhausted"))
    }
}
