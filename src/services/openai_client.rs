use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{AgentError, Result};

const MAX_RETRIES: usize = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(250);

/// Anything that can answer an OpenAI-style chat completion request.
///
/// `body` is a complete request (see [`ChatCompletionRequest`]); the return
/// value is the provider's JSON reply.
#[async_trait]
pub trait ChatModel: Send + Sync + std::fmt::Debug {
    async fn chat_completion(&self, body: &Value) -> Result<Value>;
}

/// `reqwest` client for any OpenAI-compatible `/chat/completions` endpoint
#[derive(Clone, Debug)]
pub struct OpenAIClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AgentError::Http(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl ChatModel for OpenAIClient {
    async fn chat_completion(&self, body: &Value) -> Result<Value> {
        let request_url = build_chat_url(&self.base_url);
        let mut attempt = 0;
        let mut backoff = INITIAL_BACKOFF;

        loop {
            let response = self
                .http
                .post(&request_url)
                .bearer_auth(&self.api_key)
                .header("X-Title", "trip-agent-rs")
                .json(body)
                .send()
                .await
                .map_err(|err| {
                    if err.is_timeout() {
                        AgentError::Timeout(format!("chat completion request timed out: {err}"))
                    } else {
                        AgentError::Http(format!("HTTP request failed: {err}"))
                    }
                })?;

            let status = response.status();
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_secs);
            let response_text = response
                .text()
                .await
                .map_err(|err| AgentError::Http(format!("failed to read response: {err}")))?;

            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait = retry_after.unwrap_or(backoff);
                if attempt < MAX_RETRIES {
                    warn!(
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "rate limited, retrying"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                    backoff *= 2;
                    continue;
                }
                return Err(AgentError::RateLimit {
                    retry_after: wait.as_secs().max(1),
                });
            }

            if status.is_server_error() && attempt < MAX_RETRIES {
                warn!(attempt, %status, "provider server error, retrying");
                tokio::time::sleep(backoff).await;
                attempt += 1;
                backoff *= 2;
                continue;
            }

            let response_json: Value = match serde_json::from_str(&response_text) {
                Ok(value) => value,
                Err(_) if !status.is_success() => {
                    return Err(AgentError::Provider(format!(
                        "HTTP {}: {}",
                        status, response_text
                    )))
                }
                Err(err) => {
                    return Err(AgentError::Provider(format!(
                        "response was not JSON: {err}"
                    )))
                }
            };

            if let Some(message) = api_error_message(&response_json) {
                return Err(AgentError::Provider(if status.is_success() {
                    format!("API error: {}", message)
                } else {
                    format!("HTTP {}: {}", status, message)
                }));
            }

            if !status.is_success() {
                return Err(AgentError::Provider(format!(
                    "HTTP {}: {}",
                    status, response_text
                )));
            }

            debug!(%status, attempt, "chat completion succeeded");
            return Ok(response_json);
        }
    }
}

fn api_error_message(response: &Value) -> Option<String> {
    let error = response.get("error").filter(|error| !error.is_null())?;
    Some(
        error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
    )
}

fn build_chat_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{}/chat/completions", trimmed)
    }
}

/// Builder for a chat completion request body
#[derive(Clone, Debug)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Value>,
    tools: Vec<Value>,
    tool_choice: Option<Value>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            tool_choice: None,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: Value) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn into_value(self) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.messages,
        });

        if !self.tools.is_empty() {
            body["tools"] = Value::Array(self.tools);
        }

        if let Some(tool_choice) = self.tool_choice {
            body["tool_choice"] = tool_choice;
        }

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }

        body
    }
}
