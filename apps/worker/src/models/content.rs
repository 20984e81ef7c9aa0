use serde::{Deserialize, Serialize};

use crate::models::entry::ContentType;

/// One slide of a carousel post. `image_url` is filled in only when an
/// asset has been generated for the slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselSlide {
    pub slide: u32,
    pub focus: String,
    pub description: String,
    pub image_url: Option<String>,
}

/// A labeled section of a reel/video script ("hook", "cta", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptSection {
    pub label: String,
    pub text: String,
}

/// Structured pieces of an email campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailElements {
    pub subject: String,
    pub preview_text: String,
    pub body: String,
    pub cta: String,
}

/// The synthesized output for one calendar entry. Pipeline-local; merged
/// with the generated asset into a single row at the persistence stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub platform: String,
    pub topic: String,
    pub content_type: ContentType,
    pub title: String,
    /// Synthesized body text; the persisted body prefers the generated
    /// caption when one exists.
    pub content: String,
    /// Order-preserving; duplicates are allowed.
    pub hashtags: Vec<String>,
    pub image_type: String,
    pub aspect_ratio: String,
    /// Gates the image generation stage.
    pub generate_image: bool,
    /// Set for script-only types (reel/video) instead of `generate_image`.
    pub generate_script: bool,
    pub carousel: Option<Vec<CarouselSlide>>,
    pub script: Option<Vec<ScriptSection>>,
    pub email: Option<EmailElements>,
    pub duration: Option<String>,
    pub interactive_elements: Option<Vec<String>>,
}

/// Result of the image stage: a stored asset URL plus its caption.
/// Absent entirely when generation, fetch, or upload failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedAsset {
    pub url: String,
    pub caption: String,
}
