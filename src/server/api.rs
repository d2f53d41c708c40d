use crate::error::RelayError;
use crate::models::chat::{ ChatCompletionRequest, ChatCompletionResponse };
use crate::models::interaction::{ InteractionResponse, InteractionStats };
use crate::relay::{ CompletionRelay, DEFAULT_LIST_LIMIT };
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::{ State, Query },
    http::{ HeaderMap, header::AUTHORIZATION },
};
use serde::{ Deserialize, Serialize };
use tower_http::cors::{ Any, CorsLayer };

pub const SERVICE_NAME: &str = "vapi-custom-llm";

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

#[derive(Clone)]
struct AppState {
    relay: Arc<CompletionRelay>,
}

pub fn router(relay: Arc<CompletionRelay>) -> Router {
    let app_state = AppState { relay };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/chat/completions", post(chat_completions_handler))
        .route("/interactions", get(list_interactions_handler))
        .route("/interactions/stats", get(stats_handler))
        .layer(cors)
        .with_state(app_state)
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy", service: SERVICE_NAME })
}

async fn chat_completions_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ChatCompletionRequest>,
) -> Result<Json<ChatCompletionResponse>, RelayError> {
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let resp = state.relay.handle_completion(req, authorization).await?;
    Ok(Json(resp))
}

async fn list_interactions_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<InteractionResponse>>, RelayError> {
    let rows = state.relay.list_interactions(params.limit, params.offset).await?;
    Ok(Json(rows))
}

async fn stats_handler(
    State(state): State<AppState>,
) -> Result<Json<InteractionStats>, RelayError> {
    Ok(Json(state.relay.stats().await?))
}
