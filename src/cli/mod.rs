use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Host address and port for the HTTP server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:8000")]
    pub server_addr: String,

    /// Optional API Key callers must send as `Authorization: Bearer <key>`. If unset, every request is accepted.
    #[arg(long, env = "SERVER_API_KEY")]
    pub server_api_key: Option<String>,

    // --- Chat LLM Provider Args ---
    /// API Key for the upstream chat completion provider.
    #[arg(long, env = "OPENAI_API_KEY", default_value = "")]
    pub chat_api_key: String,

    /// Base URL of the OpenAI compatible provider. `/v1/chat/completions` is appended.
    #[arg(long, env = "OPENAI_BASE_URL")] // No default, let the adapter handle it
    pub chat_base_url: Option<String>,

    /// Model used when a request does not name one.
    #[arg(long, env = "CHAT_MODEL", default_value = "gpt-3.5-turbo")]
    pub chat_model: String,

    /// Sampling temperature used when a request does not set one.
    #[arg(long, env = "CHAT_TEMPERATURE", default_value = "0.7")]
    pub chat_temperature: f64,

    /// Completion token cap used when a request does not set one.
    #[arg(long, env = "CHAT_MAX_TOKENS", default_value = "1000")]
    pub chat_max_tokens: u32,

    /// Timeout in seconds for a single upstream call.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value = "60")]
    pub upstream_timeout_secs: u64,

    // --- Storage Args ---
    /// Interaction log store (sqlite:///relative.db, sqlite:////absolute.db, sqlite::memory:, postgres://...)
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:////app/data/vapi_custom_llm.db")]
    pub database_url: String,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,

    /// Optional path to the TLS certificate file (PEM format) for enabling HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

impl Args {
    /// Caller key with blank values treated as unset.
    pub fn expected_api_key(&self) -> Option<String> {
        self.server_api_key.clone().filter(|k| !k.trim().is_empty())
    }

    /// Database URL with the password, if any, masked for logging.
    pub fn redacted_database_url(&self) -> String {
        redact_url(&self.database_url)
    }
}

fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((userinfo, host)) = rest.split_once('@') else {
        return url.to_string();
    };
    match userinfo.split_once(':') {
        Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["vapi-custom-llm"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn defaults_match_documented_values() {
        let args = parse(&["--chat-api-key", "sk-test", "--database-url", "sqlite::memory:"]);
        assert_eq!(args.chat_model, "gpt-3.5-turbo");
        assert_eq!(args.chat_temperature, 0.7);
        assert_eq!(args.chat_max_tokens, 1000);
        assert_eq!(args.upstream_timeout_secs, 60);
        assert!(!args.enable_tls);
    }

    #[test]
    fn database_defaults_to_mounted_volume() {
        let args = parse(&[]);
        assert_eq!(args.database_url, "sqlite:////app/data/vapi_custom_llm.db");
    }

    #[test]
    fn blank_server_key_is_treated_as_unset() {
        let args = parse(&["--server-api-key", "  "]);
        assert_eq!(args.expected_api_key(), None);

        let args = parse(&["--server-api-key", "secret"]);
        assert_eq!(args.expected_api_key().as_deref(), Some("secret"));
    }

    #[test]
    fn password_is_masked() {
        assert_eq!(
            redact_url("postgres://app:hunter2@db:5432/llm"),
            "postgres://app:***@db:5432/llm"
        );
        assert_eq!(redact_url("sqlite:///data/x.db"), "sqlite:///data/x.db");
    }
}
