pub mod chat;

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Connection settings for the upstream provider. Built once at startup and
/// handed to the client; nothing reads provider credentials from globals.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout: Duration::from_secs(60),
        }
    }
}
