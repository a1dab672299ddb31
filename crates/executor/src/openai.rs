use async_stream::try_stream;
use async_trait::async_trait;
use quorum_common::QuorumError;
use quorum_common::Result;
use serde::{Deserialize, Serialize};

use crate::event::TaskEvent;
use crate::executor::{TaskEventStream, TaskExecutor};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

/// Task executor speaking the OpenAI chat-completions format.
///
/// Works against the OpenAI API or any compatible endpoint (the default
/// base URL targets a local Ollama server).
pub struct OpenAiExecutor {
    base_url: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl OpenAiExecutor {
    pub fn new(base_url: Option<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            http_client: reqwest::Client::new(),
        }
    }

    fn build_request_body(instruction: &str, model_id: &str) -> OpenAiRequest {
        OpenAiRequest {
            model: model_id.to_string(),
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content: instruction.to_string(),
            }],
        }
    }

    /// Turn a raw HTTP status and body into the first choice's content.
    fn extract_content(status: reqwest::StatusCode, body_text: &str) -> Result<String> {
        if !status.is_success() {
            return Err(QuorumError::ExecutorStream(format!(
                "OpenAI API error {status}: {body_text}"
            )));
        }

        let response: OpenAiResponse = serde_json::from_str(body_text).map_err(|e| {
            QuorumError::ExecutorStream(format!("Failed to parse OpenAI response: {e}"))
        })?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            QuorumError::ExecutorStream("No choices in OpenAI response".to_string())
        })?;

        Ok(choice.message.content)
    }
}

#[async_trait]
impl TaskExecutor for OpenAiExecutor {
    async fn invoke(&self, instruction: &str, model_id: &str) -> Result<TaskEventStream> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = Self::build_request_body(instruction, model_id);
        let model = model_id.to_string();
        let api_key = self.api_key.clone();
        let http_client = self.http_client.clone();

        let stream = try_stream! {
            yield TaskEvent::Started { model };

            let mut http_req = http_client.post(&url).json(&body);
            if let Some(ref key) = api_key {
                http_req = http_req.bearer_auth(key);
            }

            let response = http_req.send().await.map_err(|e| {
                QuorumError::ExecutorStream(format!("OpenAI request failed: {e}"))
            })?;

            // Read the body once; status handling and parsing both need it.
            let status = response.status();
            let body_text = response.text().await.map_err(|e| {
                QuorumError::ExecutorStream(format!("Failed to read OpenAI response: {e}"))
            })?;

            let content = Self::extract_content(status, &body_text)?;
            yield TaskEvent::Completion { content };
        };

        Ok(Box::pin(stream))
    }

    fn name(&self) -> &str {
        "openai"
    }
}
