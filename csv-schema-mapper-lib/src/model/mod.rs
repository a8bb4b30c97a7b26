//! Language-model clients used by schema inference.
//!
//! The pipeline only needs text in, text out. Retries and deadlines belong to
//! whoever constructs the client.

mod chat;

pub use chat::{
    ChatCompletionConfig, ChatCompletionModel, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Failed to parse model response: {0}")]
    ResponseParsing(String),
    #[error("Model returned no content")]
    EmptyResponse,
    #[error("{0}")]
    Other(String),
}

/// A synchronous text-generation backend.
pub trait LanguageModel {
    fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

impl<F> LanguageModel for F
where
    F: Fn(&str) -> Result<String, ModelError>,
{
    fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        self(prompt)
    }
}

/// Always answers with the same text. Useful for replaying a saved response.
#[derive(Debug, Clone)]
pub struct StaticModel {
    response: String,
}

impl StaticModel {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }

    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        tracing::info!("Replaying model response from {}", path.display());
        Ok(Self::new(std::fs::read_to_string(path)?))
    }
}

impl LanguageModel for StaticModel {
    fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        tracing::debug!("Static model ignoring prompt of {} bytes", prompt.len());
        Ok(self.response.clone())
    }
}
