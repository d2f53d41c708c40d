use serde::{ Serialize, Deserialize };

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self { role: role.into(), content: content.into() }
    }
}

/// Body of `POST /chat/completions`. Fields the calling platform adds on top
/// of these (`stream`, `call`, `metadata`, ...) are ignored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
    pub model: String,
    pub usage: Usage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_accepts_minimal_body_and_ignores_extras() {
        let body = json!({
            "messages": [{ "role": "user", "content": "Hi" }],
            "stream": false,
            "call": { "id": "abc" }
        });
        let req: ChatCompletionRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.messages, vec![ChatMessage::new("user", "Hi")]);
        assert!(req.model.is_none());
        assert!(req.temperature.is_none());
        assert!(req.max_tokens.is_none());
        assert!(req.system_prompt.is_none());
    }

    #[test]
    fn request_without_messages_is_rejected() {
        let err = serde_json::from_value::<ChatCompletionRequest>(json!({ "model": "x" }));
        assert!(err.is_err());
    }

    #[test]
    fn response_serializes_to_caller_shape() {
        let resp = ChatCompletionResponse {
            choices: vec![Choice {
                message: ChatMessage::new("assistant", "Hello there"),
                finish_reason: Some("stop".into()),
            }],
            model: "gpt-3.5-turbo".into(),
            usage: Usage { prompt_tokens: 5, completion_tokens: 3, total_tokens: 8 },
        };
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({
                "choices": [{
                    "message": { "role": "assistant", "content": "Hello there" },
                    "finish_reason": "stop"
                }],
                "model": "gpt-3.5-turbo",
                "usage": { "prompt_tokens": 5, "completion_tokens": 3, "total_tokens": 8 }
            })
        );
    }
}
