//! # Writing Assistant
//!
//! Two prompt flows behind a [`CompletionProvider`]: raw-material sourcing
//! ideas and content/SEO suggestions. The provider returns a JSON value; each
//! flow checks it against its output shape before handing it back.

use crate::config::AiConfig;
use async_trait::async_trait;
use pharmasite_common::defaults::BRAND_NAME;
use pharmasite_editor::{ContentSuggestionRequest, SourcingRequest};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

pub const INVALID_KEY_TEXT: &str = "The AI service rejected the configured API key.";
pub const GENERIC_TEXT: &str = "Failed to get suggestions from the AI. Please try again later.";

#[derive(Error, Debug)]
pub enum AiError {
    #[error("No AI provider is configured")]
    Disabled,

    #[error("The AI service rejected the API key: {0}")]
    InvalidKey(String),

    #[error("AI request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI service answered {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("AI answer did not match the expected shape: {0}")]
    Malformed(String),
}

impl AiError {
    /// Text safe to show an editor
    pub fn user_message(&self) -> &'static str {
        match self {
            AiError::InvalidKey(_) => INVALID_KEY_TEXT,
            _ => GENERIC_TEXT,
        }
    }
}

pub type AiResult<T> = Result<T, AiError>;

/// Turns a prompt into a JSON answer
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> AiResult<Value>;
}

/// Used when no API key is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledProvider;

#[async_trait]
impl CompletionProvider for DisabledProvider {
    async fn complete(&self, _prompt: &str) -> AiResult<Value> {
        Err(AiError::Disabled)
    }
}

/// Gemini `generateContent` over HTTP, asking for a JSON response
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GeminiProvider {
    pub fn new(config: &AiConfig, api_key: String) -> AiResult<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(&self, prompt: &str) -> AiResult<Value> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" }
        });

        let response = self
            .client
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, message));
        }

        let answer: GenerateResponse = response.json().await?;
        let text: String = answer
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        parse_answer(&text)
    }
}

fn classify_failure(status: StatusCode, message: String) -> AiError {
    let key_problem = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || message.contains("API_KEY_INVALID")
        || message.contains("API key not valid");

    if key_problem {
        AiError::InvalidKey(message)
    } else {
        AiError::Status { status, message }
    }
}

/// Models sometimes fence their JSON; accept that
fn parse_answer(text: &str) -> AiResult<Value> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(unfenced.trim()).map_err(|e| AiError::Malformed(e.to_string()))
}

/// Provider for `config`: Gemini with a key, disabled without one
pub fn provider_from_config(config: &AiConfig) -> Arc<dyn CompletionProvider> {
    match config.api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => match GeminiProvider::new(config, key.to_string()) {
            Ok(provider) => {
                info!(model = %config.model, "AI suggestions enabled");
                Arc::new(provider)
            }
            Err(e) => {
                error!(error = %e, "Could not build AI client; suggestions disabled");
                Arc::new(DisabledProvider)
            }
        },
        None => {
            info!("No AI API key configured; suggestions disabled");
            Arc::new(DisabledProvider)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcingSuggestions {
    pub suggested_sources: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSuggestions {
    pub suggested_keywords: String,
    pub rewritten_sentences: String,
    pub rephrased_paragraphs: String,
}

pub fn sourcing_prompt(input: &SourcingRequest) -> String {
    format!(
        "You are an expert in raw materials sourcing for the pharmaceutical and chemical industries.\n\
         Based on the current product range and market trends, suggest potential new raw material sources \
         and justify each one.\n\n\
         Current Product Range: {}\n\
         Market Trends: {}\n\n\
         Answer with a JSON object with a single string field \"suggestedSources\".",
        input.current_product_range, input.market_trends
    )
}

pub fn content_prompt(input: &ContentSuggestionRequest) -> String {
    format!(
        "You suggest website content and SEO improvements for {}, a pharmaceutical company.\n\n\
         Brand Keywords: {}\n\
         Product Description: {}\n\
         Mission Statement: {}\n\
         Vision Statement: {}\n\
         Company Values: {}\n\
         Current Content: {}\n\n\
         Provide keywords for SEO, rewritten sentences for clarity and engagement, and rephrased \
         paragraphs for readability and impact. Answer with a JSON object with the string fields \
         \"suggestedKeywords\", \"rewrittenSentences\" and \"rephrasedParagraphs\".",
        BRAND_NAME,
        input.brand_keywords,
        input.product_description,
        input.mission_statement,
        input.vision_statement,
        input.company_values,
        input.current_content.as_deref().unwrap_or(""),
    )
}

async fn run_flow<T: DeserializeOwned>(provider: &dyn CompletionProvider, name: &str, prompt: String) -> AiResult<T> {
    let answer = provider.complete(&prompt).await.map_err(|e| {
        error!(flow = name, error = %e, "AI flow failed");
        e
    })?;

    serde_json::from_value(answer).map_err(|e| {
        error!(flow = name, error = %e, "AI answer had the wrong shape");
        AiError::Malformed(e.to_string())
    })
}

pub async fn suggest_new_sources(
    provider: &dyn CompletionProvider,
    input: &SourcingRequest,
) -> AiResult<SourcingSuggestions> {
    run_flow(provider, "suggest_new_sources", sourcing_prompt(input)).await
}

pub async fn generate_content_suggestions(
    provider: &dyn CompletionProvider,
    input: &ContentSuggestionRequest,
) -> AiResult<ContentSuggestions> {
    run_flow(provider, "generate_content_suggestions", content_prompt(input)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Returns a canned answer and remembers the prompt
    struct Canned {
        answer: Value,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionProvider for Canned {
        async fn complete(&self, prompt: &str) -> AiResult<Value> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.answer.clone())
        }
    }

    fn canned(answer: Value) -> Canned {
        Canned {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn test_sourcing_flow() {
        let provider = canned(json!({ "suggestedSources": "Gujarat API clusters" }));
        let input = SourcingRequest {
            current_product_range: "Paracetamol, Amoxicillin".into(),
            market_trends: "Rising demand for generics".into(),
        };

        let out = suggest_new_sources(&provider, &input).await.unwrap();
        assert_eq!(out.suggested_sources, "Gujarat API clusters");
        assert!(provider.prompts.lock().unwrap()[0].contains("Rising demand for generics"));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_malformed() {
        let provider = canned(json!({ "suggestedKeywords": "a" }));
        let err = generate_content_suggestions(&provider, &ContentSuggestionRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Malformed(_)));
        assert_eq!(err.user_message(), GENERIC_TEXT);
    }

    #[tokio::test]
    async fn test_disabled_provider() {
        let err = suggest_new_sources(&DisabledProvider, &SourcingRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Disabled));
        assert_eq!(err.user_message(), GENERIC_TEXT);
    }

    #[test]
    fn test_invalid_key_detection() {
        let err = classify_failure(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"message":"API key not valid. Please pass a valid API key."}}"#.into(),
        );
        assert_eq!(err.user_message(), INVALID_KEY_TEXT);

        let err = classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "boom".into());
        assert_eq!(err.user_message(), GENERIC_TEXT);
    }

    #[test]
    fn test_parse_fenced_answer() {
        let value = parse_answer("```json\n{\"suggestedSources\": \"x\"}\n```").unwrap();
        assert_eq!(value["suggestedSources"], "x");
        assert!(parse_answer("not json").is_err());
    }

    #[test]
    fn test_content_prompt_optional_current_content() {
        let input = ContentSuggestionRequest {
            brand_keywords: "quality generics".into(),
            current_content: Some("Old hero copy".into()),
            ..ContentSuggestionRequest::default()
        };
        let prompt = content_prompt(&input);
        assert!(prompt.contains("quality generics"));
        assert!(prompt.contains("Old hero copy"));
        assert!(prompt.contains(BRAND_NAME));
    }
}
