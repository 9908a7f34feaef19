//! Claude Messages API client.
//!
//! A thin wrapper over `reqwest` for the Anthropic Messages endpoint.
//! Requests optionally carry an extended-thinking budget; replies are
//! flattened into the concatenated text blocks plus any thinking trace.
//! Token usage and elapsed time are logged for every call.
//!
//! Calls are not retried here: only the network-bound Wikipedia fetches
//! carry a retry policy, and a failed generation aborts that language's
//! run.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
/// Generation can take a while with thinking enabled.
const TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking: Option<ThinkingParam>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ThinkingParam {
    #[serde(rename = "type")]
    kind: &'static str,
    budget_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    Thinking { thinking: String },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

/// A model reply, flattened from the content blocks.
#[derive(Debug)]
pub struct Reply {
    pub text: String,
    pub thinking: String,
}

pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    pub fn new(api_key: String, model: String) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a single-turn prompt and return the flattened reply.
    ///
    /// `thinking_budget` switches the request to extended thinking with
    /// the given token budget.
    #[instrument(level = "info", skip(self, prompt), fields(model = %self.model))]
    pub async fn ask(
        &self,
        prompt: &str,
        max_tokens: u32,
        thinking_budget: Option<u32>,
    ) -> Result<Reply, ApiError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            messages: vec![WireMessage {
                role: "user",
                content: prompt,
            }],
            thinking: thinking_budget.map(|budget_tokens| ThinkingParam {
                kind: "enabled",
                budget_tokens,
            }),
        };

        let t0 = Instant::now();
        let response = self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(%status, body = %crate::utils::truncate_for_log(&body, 300), "API call failed");
            return Err(ApiError::Status { status, body });
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)?;
        let reply = flatten(parsed.content)?;

        let dt = t0.elapsed();
        match parsed.usage {
            Some(usage) => info!(
                elapsed_ms = dt.as_millis() as u64,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "API call completed"
            ),
            None => info!(elapsed_ms = dt.as_millis() as u64, "API call completed"),
        }

        Ok(reply)
    }
}

fn flatten(blocks: Vec<ContentBlock>) -> Result<Reply, ApiError> {
    let mut text = String::new();
    let mut thinking = String::new();
    for block in blocks {
        match block {
            ContentBlock::Text { text: t } => text.push_str(&t),
            ContentBlock::Thinking { thinking: t } => thinking.push_str(&t),
            ContentBlock::Unknown => {}
        }
    }
    if text.is_empty() {
        return Err(ApiError::EmptyResponse);
    }
    Ok(Reply { text, thinking })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_collects_text_and_thinking() {
        let blocks = vec![
            ContentBlock::Thinking {
                thinking: "pondering".into(),
            },
            ContentBlock::Text {
                text: "hello ".into(),
            },
            ContentBlock::Text {
                text: "world".into(),
            },
        ];
        let reply = flatten(blocks).unwrap();
        assert_eq!(reply.text, "hello world");
        assert_eq!(reply.thinking, "pondering");
    }

    #[test]
    fn test_flatten_rejects_empty_text() {
        let blocks = vec![ContentBlock::Thinking {
            thinking: "only thoughts".into(),
        }];
        assert!(matches!(flatten(blocks), Err(ApiError::EmptyResponse)));
    }

    #[test]
    fn test_response_deserialization_tolerates_unknown_blocks() {
        let raw = r#"{
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "tool_use", "id": "x", "name": "t", "input": {}},
                {"type": "text", "text": "answer"}
            ],
            "usage": {"input_tokens": 12, "output_tokens": 34}
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.content.len(), 3);
        let reply = flatten(parsed.content).unwrap();
        assert_eq!(reply.text, "answer");
        assert_eq!(parsed.usage.unwrap().output_tokens, 34);
    }

    #[test]
    fn test_request_serialization_omits_thinking_when_disabled() {
        let request = MessagesRequest {
            model: "claude-sonnet-4-5",
            max_tokens: 1000,
            messages: vec![WireMessage {
                role: "user",
                content: "hi",
            }],
            thinking: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("thinking").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_request_serialization_with_thinking() {
        let request = MessagesRequest {
            model: "claude-sonnet-4-5",
            max_tokens: 8000,
            messages: vec![],
            thinking: Some(ThinkingParam {
                kind: "enabled",
                budget_tokens: 2000,
            }),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["thinking"]["type"], "enabled");
        assert_eq!(json["thinking"]["budget_tokens"], 2000);
    }
}
