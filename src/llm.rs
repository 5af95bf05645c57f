//! Minimal client for an OpenAI-compatible chat-completions endpoint.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::config::{KeyStore, Settings};
use crate::consts::API_KEY_VAR;

/// One piece of a user message.
#[derive(Debug, Clone, Copy)]
pub enum Part<'a> {
    Text(&'a str),
    /// An image URL; data URLs are fine.
    Image(&'a str),
}

/// Sends single-turn chat requests. The API key is read from the store on
/// every call so a key saved mid-session is picked up immediately.
pub struct ChatClient {
    http: reqwest::Client,
    keys: Arc<KeyStore>,
    key_var: &'static str,
    endpoint: String,
    model: String,
}

impl ChatClient {
    pub fn new(keys: Arc<KeyStore>, settings: &Settings) -> Self {
        Self {
            http: reqwest::Client::new(),
            keys,
            key_var: API_KEY_VAR,
            endpoint: format!(
                "{}/chat/completions",
                settings.api_base_url.trim_end_matches('/')
            ),
            model: settings.model.clone(),
        }
    }

    /// Read the API key from `var` instead of [`API_KEY_VAR`].
    pub fn with_key_var(mut self, var: &'static str) -> Self {
        self.key_var = var;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask for a JSON object answer and return the raw message content.
    pub async fn complete_json(&self, system: &str, parts: &[Part<'_>]) -> Result<String> {
        let api_key = self.keys.get(self.key_var).ok_or_else(|| {
            anyhow::anyhow!(
                "no API key found. Run `ielts-coach key set` or set {}.",
                self.key_var
            )
        })?;

        let body = build_request(&self.model, system, parts);
        debug!(model = %self.model, parts = parts.len(), "sending chat completion");

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("scoring API error ({}): {}", status, api_error_message(&text));
        }

        let api_resp: ChatResponse = resp.json().await?;

        if let Some(usage) = &api_resp.usage {
            debug!(
                input_tokens = usage.prompt_tokens,
                output_tokens = usage.completion_tokens,
                "chat completion finished"
            );
        }

        let content = api_resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            bail!("scoring API returned an empty response");
        }
        Ok(content)
    }
}

fn build_request<'a>(model: &'a str, system: &'a str, parts: &[Part<'a>]) -> ChatRequest<'a> {
    let user = parts
        .iter()
        .map(|part| match *part {
            Part::Text(text) => ContentPart::Text { text },
            Part::Image(url) => ContentPart::ImageUrl {
                image_url: ImageUrl { url },
            },
        })
        .collect();

    ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: vec![ContentPart::Text { text: system }],
            },
            ChatMessage {
                role: "user",
                content: user,
            },
        ],
        response_format: ResponseFormat {
            format_type: "json_object",
        },
    }
}

/// Pull `error.message` out of an API error body, or fall back to the body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Extract JSON from text that may be wrapped in markdown code fences.
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(after) = trimmed.strip_prefix("```json")
        && let Some(json) = after.strip_suffix("```")
    {
        return json.trim();
    }
    if let Some(after) = trimmed.strip_prefix("```")
        && let Some(json) = after.strip_suffix("```")
    {
        return json.trim();
    }

    trimmed
}

// --- API types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
