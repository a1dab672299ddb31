use async_stream::try_stream;
use async_trait::async_trait;
use quorum_common::QuorumError;
use quorum_common::Result;
use serde::{Deserialize, Serialize};

use crate::event::TaskEvent;
use crate::executor::{TaskEventStream, TaskExecutor};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct AnthropicMessage {
    role: String,
    content: Vec<AnthropicContent>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    text: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

/// Task executor backed by the Anthropic Messages API.
///
/// Each invocation yields a [`TaskEvent::Started`] marker, performs the
/// request when the stream is polled, and terminates with a single
/// [`TaskEvent::Completion`] carrying the concatenated text blocks.
pub struct AnthropicExecutor {
    api_key: String,
    max_tokens: u32,
    http_client: reqwest::Client,
}

impl AnthropicExecutor {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            max_tokens: DEFAULT_MAX_TOKENS,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn build_request_body(&self, instruction: &str, model_id: &str) -> AnthropicRequest {
        AnthropicRequest {
            model: model_id.to_string(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: vec![AnthropicContent {
                    content_type: "text".to_string(),
                    text: instruction.to_string(),
                }],
            }],
            max_tokens: self.max_tokens,
        }
    }

    /// Turn a raw HTTP status and body into the completion text, joining
    /// all text blocks.
    fn extract_content(status: reqwest::StatusCode, body_text: &str) -> Result<String> {
        if !status.is_success() {
            return Err(QuorumError::ExecutorStream(format!(
                "Anthropic API error {status}: {body_text}"
            )));
        }

        let response: AnthropicResponse = serde_json::from_str(body_text).map_err(|e| {
            QuorumError::ExecutorStream(format!("Failed to parse Anthropic response: {e}"))
        })?;

        Ok(response
            .content
            .into_iter()
            .map(|c| c.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[async_trait]
impl TaskExecutor for AnthropicExecutor {
    async fn invoke(&self, instruction: &str, model_id: &str) -> Result<TaskEventStream> {
        let body = self.build_request_body(instruction, model_id);
        let model = model_id.to_string();
        let api_key = self.api_key.clone();
        let http_client = self.http_client.clone();

        let stream = try_stream! {
            yield TaskEvent::Started { model };

            let response = http_client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    QuorumError::ExecutorStream(format!("Anthropic request failed: {e}"))
                })?;

            // Read the body once; status handling and parsing both need it.
            let status = response.status();
            let body_text = response.text().await.map_err(|e| {
                QuorumError::ExecutorStream(format!("Failed to read Anthropic response: {e}"))
            })?;

            let content = Self::extract_content(status, &body_text)?;
            yield TaskEvent::Completion { content };
        };

        Ok(Box::pin(stream))
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
