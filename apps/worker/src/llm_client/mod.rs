//! Caption model client — the single point of entry for text-generation
//! calls. The pipeline only uses it for image captions.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
/// Intentionally hardcoded to prevent accidental drift.
pub const CAPTION_MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 300;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Pluggable caption model. Carried as `Arc<dyn CaptionModel>` so the image
/// stage can be exercised with a mock in tests.
#[async_trait]
pub trait CaptionModel: Send + Sync {
    /// Sends one user prompt and returns the model's free-text reply.
    async fn complete(&self, prompt: &str) -> Result<String, CaptionError>;
}

#[derive(Clone)]
pub struct OpenAiCaptionClient {
    client: Client,
    api_key: String,
}

impl OpenAiCaptionClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl CaptionModel for OpenAiCaptionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CaptionError> {
        let body = ChatRequest {
            model: CAPTION_MODEL,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(CaptionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(CaptionError::EmptyContent)?;

        debug!("Caption model returned {} chars", text.len());
        Ok(text)
    }
}
