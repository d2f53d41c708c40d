use crate::cli::Args;

/// Request defaults and caller auth for the completion relay.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    pub default_model: String,
    pub default_temperature: f64,
    pub default_max_tokens: u32,
    /// When `None`, every caller is accepted.
    pub expected_api_key: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            default_model: "gpt-3.5-turbo".to_string(),
            default_temperature: 0.7,
            default_max_tokens: 1000,
            expected_api_key: None,
        }
    }
}

impl From<&Args> for RelayConfig {
    fn from(args: &Args) -> Self {
        Self {
            default_model: args.chat_model.clone(),
            default_temperature: args.chat_temperature,
            default_max_tokens: args.chat_max_tokens,
            expected_api_key: args.expected_api_key(),
        }
    }
}
