//! AI proxy handlers.
//!
//! Paid endpoints: each request is admitted by the rate limiter, charged
//! up front, and only then forwarded to the LLM provider. The charge is
//! never rolled back by the engine itself; if the provider call fails after
//! a successful charge, these handlers issue an explicit compensating grant.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use velora_core::TransactionType;

use crate::analytics;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::llm::GeminiClient;
use crate::state::AppState;

// ============================================================================
// Constants
// ============================================================================

/// Coin cost of a chat message.
const CHAT_COIN_COST: i64 = 1;

/// Coin cost of a recipe generation.
const RECIPE_COIN_COST: i64 = 3;

/// How many trailing conversation turns to include in the chat prompt.
const CHAT_CONTEXT_TURNS: usize = 3;

/// A single conversation turn.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatTurn {
    /// "user" or "assistant".
    pub role: String,
    /// The message text.
    pub text: String,
}

/// Chat request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
    /// Recent conversation history.
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    /// Conversation this message belongs to.
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// The user's dietary preferences, if known.
    #[serde(default)]
    pub dietary_preferences: Option<String>,
}

/// Chat response.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// The assistant's reply.
    pub message: String,
    /// Coins charged for this message.
    pub coin_cost: i64,
    /// Balance after the charge.
    pub balance: i64,
}

/// Handle a chat message: admit, charge, generate.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if body.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message must not be empty".into()));
    }

    let llm = require_llm(&state)?;

    if !state.rate_limiter.admit(&auth.user_id) {
        return Err(ApiError::RateLimited);
    }

    let balance = state.ledger.charge(
        auth.user_id,
        CHAT_COIN_COST,
        "Chat message".into(),
        body.conversation_id.clone(),
    )?;

    let prompt = build_chat_prompt(&body);

    let message = match llm.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            return Err(refund_failed_call(
                &state,
                &auth,
                CHAT_COIN_COST,
                "Chat message",
                e.to_string(),
            ));
        }
    };

    analytics::record(
        state.store.as_ref(),
        auth.user_id,
        "chat_message",
        serde_json::json!({
            "coin_cost": CHAT_COIN_COST,
            "conversation_id": body.conversation_id,
            "success": true,
        }),
    );

    Ok(Json(ChatResponse {
        message,
        coin_cost: CHAT_COIN_COST,
        balance,
    }))
}

/// Recipe generation request.
#[derive(Debug, Deserialize)]
pub struct GenerateRecipeRequest {
    /// Ingredients the recipe must use.
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Dietary preferences to respect.
    #[serde(default)]
    pub dietary_preferences: Option<String>,
}

/// Recipe generation response.
#[derive(Debug, Serialize)]
pub struct GenerateRecipeResponse {
    /// The generated recipe document.
    pub recipe: serde_json::Value,
    /// Coins charged for the generation.
    pub coin_cost: i64,
    /// Balance after the charge.
    pub balance: i64,
}

/// Handle a recipe generation: admit, charge, generate, parse.
pub async fn generate_recipe(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<GenerateRecipeRequest>,
) -> Result<Json<GenerateRecipeResponse>, ApiError> {
    let llm = require_llm(&state)?;

    if !state.rate_limiter.admit(&auth.user_id) {
        return Err(ApiError::RateLimited);
    }

    let balance = state.ledger.charge(
        auth.user_id,
        RECIPE_COIN_COST,
        "Recipe generation".into(),
        None,
    )?;

    let prompt = build_recipe_prompt(&body);

    let text = match llm.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            return Err(refund_failed_call(
                &state,
                &auth,
                RECIPE_COIN_COST,
                "Recipe generation",
                e.to_string(),
            ));
        }
    };

    let recipe = parse_recipe_response(&text);

    analytics::record(
        state.store.as_ref(),
        auth.user_id,
        "generate_recipe",
        serde_json::json!({
            "coin_cost": RECIPE_COIN_COST,
            "success": true,
        }),
    );

    Ok(Json(GenerateRecipeResponse {
        recipe,
        coin_cost: RECIPE_COIN_COST,
        balance,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn require_llm(state: &AppState) -> Result<Arc<GeminiClient>, ApiError> {
    state
        .llm
        .clone()
        .ok_or_else(|| ApiError::ExternalService("AI provider not configured".into()))
}

/// Compensate a charge whose downstream LLM call failed, then surface the
/// provider fault. The refund goes through the normal grant path so the
/// round trip stays on the audit trail.
fn refund_failed_call(
    state: &AppState,
    auth: &AuthUser,
    amount: i64,
    operation: &str,
    provider_error: String,
) -> ApiError {
    tracing::warn!(
        user_id = %auth.user_id,
        error = %provider_error,
        operation = %operation,
        "LLM call failed after charge, refunding"
    );

    if let Err(refund_err) = state.ledger.grant(
        auth.user_id,
        amount,
        TransactionType::Earned,
        format!("Refund: {operation} failed"),
        None,
    ) {
        tracing::error!(
            user_id = %auth.user_id,
            error = %refund_err,
            "Refund after failed LLM call did not apply"
        );
    }

    ApiError::ExternalService("AI request failed. Please try again.".into())
}

fn build_chat_prompt(body: &ChatRequest) -> String {
    let context = body
        .history
        .iter()
        .rev()
        .take(CHAT_CONTEXT_TURNS)
        .rev()
        .map(|turn| format!("{}: {}", turn.role, turn.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are \"Velora Assistant\", an expert chef and cooking advisor.\n\n\
         Context from conversation:\n{context}\n\n\
         User's dietary preferences: {preferences}\n\n\
         User: {message}\n\n\
         Respond helpfully to cooking questions, provide tips, suggest \
         substitutions, and offer technique advice. Keep responses \
         conversational and helpful.",
        preferences = body.dietary_preferences.as_deref().unwrap_or("none"),
        message = body.message,
    )
}

fn build_recipe_prompt(body: &GenerateRecipeRequest) -> String {
    let ingredients = if body.ingredients.is_empty() {
        "not specified".to_string()
    } else {
        body.ingredients.join(", ")
    };

    format!(
        "You are \"Velora Assistant\", an expert chef AI. Generate a detailed \
         recipe based on the following:\n\n\
         Available ingredients: {ingredients}\n\
         Dietary preferences: {preferences}\n\n\
         Respond ONLY with a valid JSON object with these fields: title, \
         prep_time, cook_time, servings, difficulty, cuisine_type, \
         ingredients (name/quantity/unit), steps (step_number/text), \
         nutrition (calories/protein/carbs/fat), summary.",
        preferences = body.dietary_preferences.as_deref().unwrap_or("none"),
    )
}

/// Parse the model's recipe output leniently: extract the outermost JSON
/// object if present, otherwise wrap the raw text in a minimal recipe.
fn parse_recipe_response(text: &str) -> serde_json::Value {
    let candidate = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    };

    serde_json::from_str(candidate).unwrap_or_else(|_| {
        serde_json::json!({
            "title": "Generated Recipe",
            "summary": text,
            "difficulty": "medium",
            "cuisine_type": "Various",
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_parsing_extracts_embedded_json() {
        let text = "Here you go:\n{\"title\": \"Dal\", \"servings\": 4}\nEnjoy!";
        let recipe = parse_recipe_response(text);
        assert_eq!(recipe["title"], "Dal");
        assert_eq!(recipe["servings"], 4);
    }

    #[test]
    fn recipe_parsing_falls_back_to_summary() {
        let recipe = parse_recipe_response("Just boil the lentils.");
        assert_eq!(recipe["title"], "Generated Recipe");
        assert_eq!(recipe["summary"], "Just boil the lentils.");
    }

    #[test]
    fn chat_prompt_keeps_last_turns_only() {
        let body = ChatRequest {
            message: "What next?".into(),
            history: (1..=5)
                .map(|i| ChatTurn {
                    role: "user".into(),
                    text: format!("turn {i}"),
                })
                .collect(),
            conversation_id: None,
            dietary_preferences: None,
        };

        let prompt = build_chat_prompt(&body);
        assert!(!prompt.contains("turn 2"));
        assert!(prompt.contains("turn 3"));
        assert!(prompt.contains("turn 5"));
    }
}
