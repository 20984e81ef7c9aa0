//! Image generation stage — generate, retry once with a degraded prompt,
//! upload to object storage, caption. Every failure path here is
//! degraded-continue: the stage returns `None` and the entry proceeds
//! without an asset.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::image_client::{AssetFetcher, ImageGenerator, ImageRequest};
use crate::llm_client::CaptionModel;
use crate::models::content::{ContentRecord, GeneratedAsset};
use crate::models::context::BusinessContext;
use crate::models::entry::CalendarEntry;
use crate::pipeline::prompts::{
    basic_image_prompt, generic_caption, substitute, CAPTION_MARKER, CAPTION_PROMPT_TEMPLATE,
};
use crate::storage::AssetStore;

/// Storage prefix for pipeline-generated assets.
const ASSET_PREFIX: &str = "cron_generated";

pub struct ImageStage {
    pub generator: Arc<dyn ImageGenerator>,
    pub fetcher: Arc<dyn AssetFetcher>,
    pub store: Arc<dyn AssetStore>,
    pub captioner: Arc<dyn CaptionModel>,
}

impl ImageStage {
    /// Runs the stage for one entry. `None` is a valid, non-fatal outcome.
    pub async fn run(
        &self,
        prompt: &str,
        style: &str,
        entry: &CalendarEntry,
        record: &ContentRecord,
        ctx: &BusinessContext,
    ) -> Option<GeneratedAsset> {
        if !record.generate_image {
            debug!("Entry {} is script-only, skipping image stage", entry.id);
            return None;
        }

        // Primary attempt, then exactly one retry with the basic prompt.
        let url = match self.generate_with_retry(prompt, style, record, ctx).await {
            Some(url) => url,
            None => return None,
        };

        let bytes = match self.fetcher.fetch(&url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to download generated image for entry {}: {e}", entry.id);
                return None;
            }
        };

        let key = asset_key(&record.topic, entry.id);
        let stored_url = match self.store.put(&key, bytes, "image/png").await {
            Ok(url) => url,
            Err(e) => {
                warn!("Failed to upload image for entry {}: {e}", entry.id);
                return None;
            }
        };

        let caption = self.caption(record, ctx).await;
        info!("Generated and stored image for topic: {}", record.topic);

        Some(GeneratedAsset {
            url: stored_url,
            caption,
        })
    }

    async fn generate_with_retry(
        &self,
        prompt: &str,
        style: &str,
        record: &ContentRecord,
        ctx: &BusinessContext,
    ) -> Option<String> {
        let request = ImageRequest::standard(prompt.to_string());
        match self.generator.generate(&request).await {
            Ok(urls) => return urls.into_iter().next(),
            Err(e) => {
                warn!("Primary image generation failed, retrying with basic prompt: {e}");
            }
        }

        let basic = basic_image_prompt(
            style,
            &record.platform,
            &record.topic,
            &ctx.business_name,
            &ctx.industry,
        );
        match self.generator.generate(&ImageRequest::standard(basic)).await {
            Ok(urls) => urls.into_iter().next(),
            Err(e) => {
                warn!("Image generation retry also failed, continuing without asset: {e}");
                None
            }
        }
    }

    /// Requests a caption; any failure falls back to a synthesized generic
    /// caption rather than failing the entry.
    async fn caption(&self, record: &ContentRecord, ctx: &BusinessContext) -> String {
        let prompt = substitute(
            CAPTION_PROMPT_TEMPLATE,
            &[
                ("topic", &record.topic),
                ("platform", &record.platform),
                ("content_type", record.content_type.as_str()),
                ("business_name", &ctx.business_name),
                ("industry", &ctx.industry),
                ("target_audience", &ctx.target_audience),
                ("brand_voice", &ctx.brand_voice),
            ],
        );

        match self.captioner.complete(&prompt).await {
            Ok(reply) => match extract_caption(&reply) {
                Some(caption) => caption,
                None => {
                    warn!("Caption reply had no '{CAPTION_MARKER}' marker, using generic caption");
                    generic_caption(&record.topic, &ctx.business_name, &record.hashtags)
                }
            },
            Err(e) => {
                warn!("Caption generation failed, using generic caption: {e}");
                generic_caption(&record.topic, &ctx.business_name, &record.hashtags)
            }
        }
    }
}

/// Finds the first line prefixed with the caption marker.
fn extract_caption(reply: &str) -> Option<String> {
    reply.lines().find_map(|line| {
        line.trim()
            .strip_prefix(CAPTION_MARKER)
            .map(|rest| rest.trim().to_string())
            .filter(|c| !c.is_empty())
    })
}

/// `cron_generated/{sanitized_topic}_{entryid_prefix}_{random}.png`
fn asset_key(topic: &str, entry_id: Uuid) -> String {
    let entry_prefix: String = entry_id.simple().to_string().chars().take(8).collect();
    let random: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    format!(
        "{ASSET_PREFIX}/{}_{entry_prefix}_{random}.png",
        sanitize_topic(topic)
    )
}

/// Strips characters illegal in file paths, replaces spaces with
/// underscores, and truncates to 50 characters.
fn sanitize_topic(topic: &str) -> String {
    const ILLEGAL: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*', '\''];
    topic
        .chars()
        .filter(|c| !ILLEGAL.contains(c))
        .map(|c| if c == ' ' { '_' } else { c })
        .take(50)
        .collect()
}
