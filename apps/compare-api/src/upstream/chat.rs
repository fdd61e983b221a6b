//! Chat-completion client with JSON-schema constrained output

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{upstream_message, UpstreamError};

pub const DEFAULT_CHAT_URL: &str = "https://api.upstage.ai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "solar-pro2";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// `response_format` block requesting strict JSON-schema output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
    pub json_schema: JsonSchemaFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub schema: serde_json::Value,
    pub strict: bool,
}

impl ResponseFormat {
    pub fn strict_schema(name: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            kind: "json_schema".to_string(),
            json_schema: JsonSchemaFormat {
                name: name.into(),
                schema,
                strict: true,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub reasoning_effort: String,
    pub stream: bool,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Content of the first choice, if any
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// Sends one non-streaming completion request
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, UpstreamError>;
}

/// Upstage chat completions over HTTP
pub struct UpstageChat {
    client: Client,
    api_key: Option<String>,
    url: String,
}

impl UpstageChat {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            url: DEFAULT_CHAT_URL.to_string(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl ChatCompletion for UpstageChat {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingApiKey)?;

        debug!(model = %request.model, "Sending chat completion request");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: upstream_message(&body),
            });
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_format_serializes_type_tag() {
        let format = ResponseFormat::strict_schema("nda_analysis", json!({ "type": "object" }));
        let value = serde_json::to_value(&format).unwrap();
        assert_eq!(value["type"], "json_schema");
        assert_eq!(value["json_schema"]["name"], "nda_analysis");
        assert_eq!(value["json_schema"]["strict"], true);
    }

    #[test]
    fn first_content_handles_null_and_empty() {
        let resp: ChatResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert!(resp.first_content().is_none());

        let resp: ChatResponse =
            serde_json::from_value(json!({ "choices": [{ "message": { "content": null } }] }))
                .unwrap();
        assert!(resp.first_content().is_none());

        let resp: ChatResponse =
            serde_json::from_value(json!({ "choices": [{ "message": { "role": "assistant", "content": "{}" } }] }))
                .unwrap();
        assert_eq!(resp.first_content(), Some("{}"));
    }
}
