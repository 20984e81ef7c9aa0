use serde::{Deserialize, Serialize};

/// Default values applied field-by-field when a profile is incomplete.
/// Kept as named constants so defaulting stays auditable.
pub const DEFAULT_BUSINESS_NAME: &str = "Our Business";
pub const DEFAULT_BRAND_TONE: &str = "professional";
pub const DEFAULT_BRAND_VOICE: &str = "professional and helpful";
pub const DEFAULT_INDUSTRY: &str = "general";
pub const DEFAULT_TARGET_AUDIENCE: &str = "our audience";
pub const DEFAULT_UNIQUE_VALUE: &str = "providing value";
pub const DEFAULT_PRIMARY_COLOR: &str = "#1a1a2e";
pub const DEFAULT_SECONDARY_COLOR: &str = "#e94560";

/// Per-user brand/profile snapshot, read-only to the pipeline.
///
/// `industry` and `target_audience` are stored as lists upstream; the
/// pipeline works with the first element (or the default when the list is
/// empty), matching how the synthesis templates consume them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessContext {
    pub business_name: String,
    pub brand_tone: String,
    pub brand_voice: String,
    pub industry: String,
    pub target_audience: String,
    pub unique_value: String,
    pub content_themes: Vec<String>,
    pub primary_color: String,
    pub secondary_color: String,
    /// Precomputed comma-separated hashtag list, used verbatim when present.
    pub hashtags: Option<String>,
}

impl BusinessContext {
    /// Fully-defaulted minimal context, used when the profile lookup itself
    /// fails so downstream stages can still produce generic content.
    pub fn fallback() -> Self {
        BusinessContext {
            business_name: DEFAULT_BUSINESS_NAME.to_string(),
            brand_tone: DEFAULT_BRAND_TONE.to_string(),
            brand_voice: DEFAULT_BRAND_VOICE.to_string(),
            industry: DEFAULT_INDUSTRY.to_string(),
            target_audience: DEFAULT_TARGET_AUDIENCE.to_string(),
            unique_value: DEFAULT_UNIQUE_VALUE.to_string(),
            content_themes: vec!["business".to_string()],
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            secondary_color: DEFAULT_SECONDARY_COLOR.to_string(),
            hashtags: None,
        }
    }
}
