use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{LanguageModel, ModelError};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/v1/chat/completions";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct ChatCompletionConfig {
    /// Full URL of an OpenAI-compatible `/chat/completions` endpoint.
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout: Duration,
}

impl ChatCompletionConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: model.into(),
            api_key: None,
            temperature: 0.0,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
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

/// Blocking client for OpenAI-compatible chat completion APIs (OpenAI,
/// Groq, Ollama, vLLM and similar).
#[derive(Debug, Clone)]
pub struct ChatCompletionModel {
    client: Client,
    config: ChatCompletionConfig,
}

impl ChatCompletionModel {
    pub fn new(config: ChatCompletionConfig) -> Result<Self, ModelError> {
        tracing::debug!(
            "Creating chat completion client for model '{}' at {}",
            config.model,
            config.endpoint
        );
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ModelError::Http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn model_name(&self) -> &str {
        &self.config.model
    }

    fn extract_content(response: ChatResponse) -> Result<String, ModelError> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ModelError::EmptyResponse)
    }
}

impl LanguageModel for ChatCompletionModel {
    fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        tracing::info!(
            "Requesting schema from model '{}' ({} byte prompt)",
            self.config.model,
            prompt.len()
        );

        let mut builder = self.client.post(&self.config.endpoint).json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().map_err(|e| {
            tracing::error!("Failed to send chat completion request: {}", e);
            ModelError::Http(format!("Request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::error!("Model API returned {}: {}", status, body);
            return Err(ModelError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: ChatResponse = response.json().map_err(|e| {
            tracing::error!("Failed to parse chat completion response: {}", e);
            ModelError::ResponseParsing(e.to_string())
        })?;

        let content = Self::extract_content(parsed)?;
        tracing::debug!("Model responded with {} bytes", content.len());
        Ok(content)
    }
}
