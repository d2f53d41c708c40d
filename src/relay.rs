use crate::cli::Args;
use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::llm::LlmConfig;
use crate::llm::chat::{ ChatClient, new_client as new_chat_client };
use crate::models::chat::{ ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice };
use crate::models::interaction::{ InteractionResponse, InteractionStats, NewInteraction };
use crate::store::{ initialize_store, InteractionStore };

use log::{ debug, error, info, warn };
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

/// Logged in place of the user's words when the conversation has none.
pub const NO_USER_MESSAGE: &str = "No user message";

pub const DEFAULT_LIST_LIMIT: i64 = 100;
pub const MAX_LIST_LIMIT: i64 = 1000;

#[derive(Clone)]
pub struct CompletionRelay {
    chat_client: Arc<dyn ChatClient>,
    store: Arc<dyn InteractionStore>,
    config: Arc<RelayConfig>,
}

impl CompletionRelay {
    pub fn new(
        chat_client: Arc<dyn ChatClient>,
        store: Arc<dyn InteractionStore>,
        config: RelayConfig
    ) -> Self {
        Self { chat_client, store, config: Arc::new(config) }
    }

    pub async fn from_args(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let llm_config = LlmConfig {
            api_key: Some(args.chat_api_key.clone()).filter(|k| !k.is_empty()),
            base_url: args.chat_base_url.clone(),
            timeout: Duration::from_secs(args.upstream_timeout_secs),
        };
        let chat_client = new_chat_client(&llm_config)?;
        let base_url = chat_client.get_base_url().unwrap_or_else(|| "adapter default".to_string());
        info!(
            "Chat client configured: Model={}, BaseURL={}, Timeout={:?}",
            args.chat_model,
            base_url,
            llm_config.timeout
        );

        let store = initialize_store(&args.database_url, &args.redacted_database_url()).await?;

        Ok(Self::new(chat_client, store, RelayConfig::from(args)))
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Accepts anything when no key is configured. Otherwise the header must
    /// read exactly `Bearer <key>`.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<(), RelayError> {
        let Some(expected) = self.config.expected_api_key.as_deref() else {
            return Ok(());
        };
        match authorization {
            Some(header) if header == format!("Bearer {}", expected) => Ok(()),
            Some(_) => {
                warn!("Rejected completion request: API key mismatch");
                Err(RelayError::Auth)
            }
            None => {
                warn!("Rejected completion request: missing Authorization header");
                Err(RelayError::Auth)
            }
        }
    }

    pub async fn handle_completion(
        &self,
        request: ChatCompletionRequest,
        authorization: Option<&str>
    ) -> Result<ChatCompletionResponse, RelayError> {
        self.authorize(authorization)?;

        let messages = assemble_messages(&request);
        let model = request.model.clone().unwrap_or_else(|| self.config.default_model.clone());
        let temperature = request.temperature.unwrap_or(self.config.default_temperature);
        let max_tokens = request.max_tokens.unwrap_or(self.config.default_max_tokens);
        debug!(
            "Forwarding {} messages: model={}, temperature={}, max_tokens={}",
            messages.len(),
            model,
            temperature,
            max_tokens
        );

        let completion = match
            self.chat_client.complete(&messages, &model, temperature, max_tokens).await
        {
            Ok(c) => c,
            Err(e) => {
                error!("Upstream completion failed: {}", e);
                self.record(
                    NewInteraction::failure(
                        last_user_message(&request.messages),
                        e.to_string(),
                        model,
                        temperature
                    )
                ).await;
                return Err(RelayError::Upstream(e));
            }
        };

        self.record(
            NewInteraction::success(
                last_user_message(&messages),
                completion.content.clone(),
                model,
                temperature,
                completion.usage.total_tokens
            )
        ).await;

        info!(
            "Completion served: model={}, total_tokens={}",
            completion.model,
            completion.usage.total_tokens
        );

        Ok(ChatCompletionResponse {
            choices: vec![Choice {
                message: ChatMessage::new("assistant", completion.content),
                finish_reason: completion.finish_reason,
            }],
            model: completion.model,
            usage: completion.usage,
        })
    }

    /// Best-effort log write. Store failures end here.
    async fn record(&self, record: NewInteraction) {
        match self.store.insert(record).await {
            Ok(id) => debug!("Logged interaction {}", id),
            Err(e) => warn!("Failed to log interaction: {}", e),
        }
    }

    pub async fn list_interactions(
        &self,
        limit: i64,
        offset: i64
    ) -> Result<Vec<InteractionResponse>, RelayError> {
        let limit = limit.clamp(0, MAX_LIST_LIMIT);
        let offset = offset.max(0);
        let rows = self.store.list(limit, offset).await?;
        Ok(rows.into_iter().map(InteractionResponse::from).collect())
    }

    pub async fn stats(&self) -> Result<InteractionStats, RelayError> {
        let (count, tokens) = self.store.count_and_sum_tokens().await?;
        Ok(InteractionStats::from_totals(count, tokens))
    }
}

/// Optional system prompt first, then the caller's messages untouched.
pub fn assemble_messages(request: &ChatCompletionRequest) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if let Some(system_prompt) = &request.system_prompt {
        messages.push(ChatMessage::new("system", system_prompt.clone()));
    }
    messages.extend(request.messages.iter().cloned());
    messages
}

pub fn last_user_message(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.clone())
        .unwrap_or_else(|| NO_USER_MESSAGE.to_string())
}
