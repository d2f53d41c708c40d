use chrono::{ DateTime, Utc };
use serde::{ Serialize, Deserialize };

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// A row of the `llm_interactions` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: i64,
    pub user_message: String,
    pub assistant_response: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub tokens_used: i64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values written for a new row. The store assigns id and timestamps.
#[derive(Clone, Debug, PartialEq)]
pub struct NewInteraction {
    pub user_message: String,
    pub assistant_response: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub tokens_used: i64,
    pub error_message: Option<String>,
}

impl NewInteraction {
    pub fn success(
        user_message: String,
        assistant_response: String,
        model: String,
        temperature: f64,
        tokens_used: i64
    ) -> Self {
        Self {
            user_message,
            assistant_response: Some(assistant_response),
            model,
            temperature,
            tokens_used,
            error_message: None,
        }
    }

    pub fn failure(user_message: String, error_message: String, model: String, temperature: f64) -> Self {
        Self {
            user_message,
            assistant_response: None,
            model,
            temperature,
            tokens_used: 0,
            error_message: Some(error_message),
        }
    }
}

impl Default for NewInteraction {
    fn default() -> Self {
        Self {
            user_message: String::new(),
            assistant_response: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            tokens_used: 0,
            error_message: None,
        }
    }
}

/// Projection returned by `GET /interactions`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionResponse {
    pub id: i64,
    pub user_message: String,
    pub assistant_response: Option<String>,
    pub model: String,
    pub tokens_used: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Interaction> for InteractionResponse {
    fn from(row: Interaction) -> Self {
        Self {
            id: row.id,
            user_message: row.user_message,
            assistant_response: row.assistant_response,
            model: row.model,
            tokens_used: row.tokens_used,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionStats {
    pub total_interactions: i64,
    pub total_tokens_used: i64,
    pub average_tokens_per_interaction: i64,
}

impl InteractionStats {
    /// Average is floor division of tokens by count, 0 for an empty log.
    pub fn from_totals(total_interactions: i64, total_tokens_used: i64) -> Self {
        let average_tokens_per_interaction = if total_interactions > 0 {
            total_tokens_used.div_euclid(total_interactions)
        } else {
            0
        };
        Self { total_interactions, total_tokens_used, average_tokens_per_interaction }
    }
}
