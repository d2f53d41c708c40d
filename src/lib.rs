pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod relay;
pub mod server;
pub mod store;

use cli::Args;
use log::info;
use relay::CompletionRelay;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or(llm::DEFAULT_BASE_URL));
    info!("Default Model: {}", args.chat_model);
    info!("Default Temperature: {}", args.chat_temperature);
    info!("Default Max Tokens: {}", args.chat_max_tokens);
    info!("Upstream Timeout: {}s", args.upstream_timeout_secs);
    info!("Database URL: {}", args.redacted_database_url());
    info!("Caller Auth: {}", if args.expected_api_key().is_some() { "enabled" } else { "disabled" });
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let relay = Arc::new(CompletionRelay::from_args(&args).await?);
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, relay, args);
    server.run().await?;

    Ok(())
}
