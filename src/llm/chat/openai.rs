use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION}};
use serde::{Deserialize, Serialize};

use super::{ChatClient, ChatCompletion, UpstreamError};
use crate::llm::{LlmConfig, DEFAULT_BASE_URL};
use crate::models::chat::{ChatMessage, Usage};

pub struct OpenAIChatClient {
    http: HttpClient,
    base_url: String,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    model: Option<String>,
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIUsage {
    prompt_tokens: i64,
    completion_tokens: i64,
    total_tokens: i64,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, UpstreamError> {
        let api_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| UpstreamError::Config(format!("Invalid API key format: {}", e)))?
        );

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: api_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, UpstreamError> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| UpstreamError::Config("OpenAI API key is required".to_string()))?;

        Self::new(api_key, config.base_url.clone(), config.timeout)
    }

    fn completions_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/v1/chat/completions") {
            base.to_string()
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<ChatCompletion, UpstreamError> {
        let req = OpenAIChatRequest {
            model,
            messages,
            temperature,
            max_tokens,
        };

        let resp = self.http.post(self.completions_url())
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(UpstreamError::Status { status: status.as_u16(), body });
        }
        debug!("OpenAI raw response: {}", body);

        let parsed: OpenAIResponse = serde_json::from_str(&body)
            .map_err(|e| UpstreamError::Malformed(e.to_string()))?;

        let usage = parsed.usage
            .ok_or_else(|| UpstreamError::Malformed("response has no usage".to_string()))?;
        let choice = parsed.choices
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::Malformed("response has no choices".to_string()))?;

        Ok(ChatCompletion {
            content: choice.message.content.unwrap_or_default(),
            finish_reason: choice.finish_reason,
            model: parsed.model.unwrap_or_else(|| model.to_string()),
            usage: Usage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            },
        })
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn client_for(server: &MockServer) -> OpenAIChatClient {
        OpenAIChatClient::new("sk-test".into(), Some(server.base_url()), Duration::from_secs(5)).unwrap()
    }

    fn hi() -> Vec<ChatMessage> {
        vec![ChatMessage::new("user", "Hi")]
    }

    #[tokio::test]
    async fn sends_conversation_and_parses_reply() {
        let server = MockServer::start_async().await;
        let mock = server.mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-test")
                .json_body(json!({
                    "model": "gpt-3.5-turbo",
                    "messages": [{ "role": "user", "content": "Hi" }],
                    "temperature": 0.5,
                    "max_tokens": 150
                }));
            then.status(200).json_body(json!({
                "id": "chatcmpl-1",
                "model": "gpt-3.5-turbo-0125",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": "Hello there" },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 5, "completion_tokens": 3, "total_tokens": 8 }
            }));
        }).await;

        let completion = client_for(&server)
            .complete(&hi(), "gpt-3.5-turbo", 0.5, 150)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(completion.content, "Hello there");
        assert_eq!(completion.finish_reason.as_deref(), Some("stop"));
        assert_eq!(completion.model, "gpt-3.5-turbo-0125");
        assert_eq!(completion.usage, Usage { prompt_tokens: 5, completion_tokens: 3, total_tokens: 8 });
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(429).body("rate limited");
        }).await;

        let err = client_for(&server)
            .complete(&hi(), "gpt-3.5-turbo", 0.7, 1000)
            .await
            .unwrap_err();

        match err {
            UpstreamError::Status { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_usage_is_malformed() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({
                "choices": [{ "message": { "content": "hi" }, "finish_reason": "stop" }]
            }));
        }).await;

        let err = client_for(&server)
            .complete(&hi(), "gpt-3.5-turbo", 0.7, 1000)
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed(_)));
    }

    #[tokio::test]
    async fn empty_choices_is_malformed() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({
                "choices": [],
                "usage": { "prompt_tokens": 1, "completion_tokens": 0, "total_tokens": 1 }
            }));
        }).await;

        let err = client_for(&server)
            .complete(&hi(), "gpt-3.5-turbo", 0.7, 1000)
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed(_)));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).body("<html>gateway</html>");
        }).await;

        let err = client_for(&server)
            .complete(&hi(), "gpt-3.5-turbo", 0.7, 1000)
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed(_)));
    }

    #[tokio::test]
    async fn unreachable_provider_is_request_error() {
        let client = OpenAIChatClient::new(
            "sk-test".into(),
            Some("http://127.0.0.1:9".into()),
            Duration::from_secs(2),
        ).unwrap();

        let err = client.complete(&hi(), "gpt-3.5-turbo", 0.7, 1000).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Request(_)));
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let config = LlmConfig { api_key: Some("".into()), ..LlmConfig::default() };
        assert!(matches!(OpenAIChatClient::from_config(&config), Err(UpstreamError::Config(_))));
    }

    #[test]
    fn full_endpoint_url_is_not_doubled() {
        let client = OpenAIChatClient::new(
            "k".into(),
            Some("https://example.test/v1/chat/completions/".into()),
            Duration::from_secs(1),
        ).unwrap();
        assert_eq!(client.completions_url(), "https://example.test/v1/chat/completions");
    }
}
