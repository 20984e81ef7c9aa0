//! Image API client — the single point of entry for all image-generation
//! calls in the worker. No other module may call the images API directly.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const OPENAI_IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";
/// Intentionally hardcoded to prevent accidental drift.
pub const IMAGE_MODEL: &str = "dall-e-3";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("API returned no image URLs")]
    EmptyResponse,
}

/// Request contract for the image API: prompt, size, quality, count.
#[derive(Debug, Clone, Serialize)]
pub struct ImageRequest {
    pub prompt: String,
    pub size: String,
    pub quality: String,
    pub n: u32,
}

impl ImageRequest {
    /// The pipeline's standard request: one 1024x1024 standard-quality image.
    pub fn standard(prompt: String) -> Self {
        ImageRequest {
            prompt,
            size: "1024x1024".to_string(),
            quality: "standard".to_string(),
            n: 1,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerationsBody<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    quality: &'a str,
    n: u32,
}

#[derive(Debug, Deserialize)]
struct GenerationsResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Pluggable image generator. Carried as `Arc<dyn ImageGenerator>` so the
/// image stage can be exercised with a mock in tests.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns one or more hosted image URLs for the request.
    async fn generate(&self, request: &ImageRequest) -> Result<Vec<String>, ImageError>;
}

/// Fetches generated image bytes from their temporary hosting URL.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, ImageError>;
}

#[derive(Clone)]
pub struct OpenAiImageClient {
    client: Client,
    api_key: String,
}

impl OpenAiImageClient {
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
impl ImageGenerator for OpenAiImageClient {
    async fn generate(&self, request: &ImageRequest) -> Result<Vec<String>, ImageError> {
        let body = GenerationsBody {
            model: IMAGE_MODEL,
            prompt: &request.prompt,
            size: &request.size,
            quality: &request.quality,
            n: request.n,
        };

        let response = self
            .client
            .post(OPENAI_IMAGES_URL)
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
            return Err(ImageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerationsResponse = response.json().await?;
        let urls: Vec<String> = parsed.data.into_iter().filter_map(|d| d.url).collect();

        if urls.is_empty() {
            return Err(ImageError::EmptyResponse);
        }

        debug!("Image API returned {} URL(s)", urls.len());
        Ok(urls)
    }
}

/// Plain reqwest-backed fetcher for generated image bytes.
#[derive(Clone)]
pub struct HttpAssetFetcher {
    client: Client,
}

impl HttpAssetFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

impl Default for HttpAssetFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, ImageError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?)
    }
}
