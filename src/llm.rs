//! Chat-completion client used for classification and synthesis
//!
//! Talks to an OpenAI-compatible `/chat/completions` endpoint.
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::config::AppConfig;
use crate::error::QueryError;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// One system + user instruction pair sent to the model
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
    /// Overrides the configured completion length when set
    pub max_tokens: Option<u32>,
}

impl ChatPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Anything that can turn a chat prompt into free text
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String>;
}

/// Reusable completion client (connection-pooled)
pub struct ChatClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl ChatClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn build_request<'a>(&'a self, prompt: &'a ChatPrompt) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &prompt.system,
                },
                Message {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: prompt.max_tokens.unwrap_or(self.max_tokens),
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl CompletionModel for ChatClient {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(QueryError::Llm("OPENAI_API_KEY not configured".to_string()));
        }

        let url = format!("{}/chat/completions", self.base_url);
        let request = self.build_request(prompt);

        debug!(model = %self.model, max_tokens = request.max_tokens, "Calling chat completion API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Chat completion request failed: {}", e);
                QueryError::Llm(format!("completion request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Chat completion error response ({}): {}", status, error_text);
            return Err(QueryError::Llm(format!(
                "completion API returned {}: {}",
                status, error_text
            )));
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            error!("Failed to parse chat completion response: {}", e);
            QueryError::Llm(format!("completion parse error: {}", e))
        })?;

        extract_answer(completion)
    }
}

fn extract_answer(completion: CompletionResponse) -> Result<String> {
    let content = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| QueryError::Llm("Empty response from completion API".to_string()))?;

    if let Some(usage) = completion.usage {
        debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Completion token usage"
        );
    }

    Ok(content.trim().to_string())
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
