pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use super::LlmConfig;
use self::openai::OpenAIChatClient;
use crate::models::chat::{ ChatMessage, Usage };

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream returned status {status}: {body}")]
    Status {
        status: u16,
        body: String,
    },
    #[error("malformed upstream response: {0}")]
    Malformed(String),
    #[error("upstream client misconfigured: {0}")]
    Config(String),
}

/// What the provider answered, before it is reshaped for the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    pub content: String,
    pub finish_reason: Option<String>,
    pub model: String,
    pub usage: Usage,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// One round trip to the provider. No retry.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
        temperature: f64,
        max_tokens: u32
    ) -> Result<ChatCompletion, UpstreamError>;

    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, UpstreamError> {
    let client = OpenAIChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
