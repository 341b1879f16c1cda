//! AI assistant endpoints.

use crate::ai::{self, AiError};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use pharmasite_editor::{ContentSuggestionRequest, FieldErrors, SourcingRequest, Validate};

fn invalid(errors: FieldErrors) -> ApiError {
    let message = errors.first().unwrap_or("Invalid input.").to_string();
    ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", message)
}

fn unavailable(e: AiError) -> ApiError {
    let code = match e {
        AiError::InvalidKey(_) => "ai_invalid_key",
        _ => "ai_unavailable",
    };
    ApiError::new(StatusCode::BAD_GATEWAY, code, e.user_message())
}

pub async fn sourcing(
    State(state): State<AppState>,
    Json(input): Json<SourcingRequest>,
) -> ApiResult<Json<ai::SourcingSuggestions>> {
    input.validate().map_err(invalid)?;
    ai::suggest_new_sources(&*state.ai, &input)
        .await
        .map(Json)
        .map_err(unavailable)
}

pub async fn content_suggestions(
    State(state): State<AppState>,
    Json(input): Json<ContentSuggestionRequest>,
) -> ApiResult<Json<ai::ContentSuggestions>> {
    input.validate().map_err(invalid)?;
    ai::generate_content_suggestions(&*state.ai, &input)
        .await
        .map(Json)
        .map_err(unavailable)
}
