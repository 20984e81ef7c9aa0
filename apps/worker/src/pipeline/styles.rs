//! Visual style classification and the style template catalog.
//!
//! `classify_style` is a pure function: same inputs, same style id. The
//! precedence order is part of the contract — an explicit requested style
//! always wins, then theme keywords, then industry, then brand tone, then
//! the default.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::models::context::BusinessContext;

/// The designated fallback style when nothing else matches.
pub const DEFAULT_STYLE: &str = "modern";

/// The closed catalog of visual style identifiers.
pub const STYLE_CATALOG: &[&str] = &[
    "modern",
    "minimalist",
    "luxury",
    "playful",
    "professional",
    "bold_vibrant",
    "elegant",
    "tech_futuristic",
    "organic_natural",
    "vintage_retro",
    "hand_drawn",
    "editorial",
    "flat_design",
    "gradient_modern",
    "monochrome",
    "pastel_soft",
    "industrial",
    "artistic_abstract",
    "photo_realistic",
    "cinematic",
];

/// Ordered keyword groups scanned against the content theme. Order matters:
/// earlier groups take priority on overlapping keywords.
const THEME_KEYWORD_GROUPS: &[(&[&str], &str)] = &[
    (&["luxury", "premium", "exclusive", "high-end"], "luxury"),
    (
        &["tech", "innovation", "digital", "software", "futur"],
        "tech_futuristic",
    ),
    (
        &["nature", "organic", "eco", "sustainab", "wellness"],
        "organic_natural",
    ),
    (
        &["fun", "playful", "celebrat", "colorful", "holiday"],
        "playful",
    ),
    (&["minimal", "clean", "simple"], "minimalist"),
    (&["vintage", "retro", "nostalg", "classic"], "vintage_retro"),
    (&["bold", "vibrant", "energy", "dynamic"], "bold_vibrant"),
    (
        &["behind the scenes", "authentic", "lifestyle"],
        "photo_realistic",
    ),
    (&["artistic", "creative", "abstract"], "artistic_abstract"),
    (&["announce", "launch", "news", "press"], "editorial"),
    (&["cinema", "film", "drama"], "cinematic"),
    (
        &["professional", "corporate", "business"],
        "professional",
    ),
];

/// Maps a (theme, context, requested style) tuple to one catalog style id.
/// Pure and deterministic; never fails.
pub fn classify_style(
    content_theme: &str,
    ctx: &BusinessContext,
    requested: Option<&str>,
) -> &'static str {
    // 1. Explicit override wins, if it names a real catalog style.
    if let Some(wanted) = requested {
        let wanted = wanted.trim().to_lowercase();
        if let Some(style) = STYLE_CATALOG.iter().copied().find(|s| *s == wanted) {
            return style;
        }
    }

    // 2. Theme keywords.
    let theme = content_theme.to_lowercase();
    for &(keywords, style) in THEME_KEYWORD_GROUPS {
        if keywords.iter().any(|k| theme.contains(*k)) {
            return style;
        }
    }

    // 3. Industry substring.
    let industry = ctx.industry.to_lowercase();
    if industry.contains("fashion") || industry.contains("beauty") {
        return "elegant";
    }
    if industry.contains("tech") || industry.contains("software") {
        return "tech_futuristic";
    }
    if industry.contains("food") || industry.contains("restaurant") {
        return "organic_natural";
    }
    if industry.contains("finance") || industry.contains("consulting") {
        return "professional";
    }

    // 4. Brand tone substring.
    let tone = ctx.brand_tone.to_lowercase();
    if tone.contains("luxurious") || tone.contains("elegant") {
        return "luxury";
    }
    if tone.contains("professional") || tone.contains("corporate") {
        return "professional";
    }
    if tone.contains("playful") || tone.contains("fun") {
        return "playful";
    }

    // 5. Fixed default.
    DEFAULT_STYLE
}

// ────────────────────────────────────────────────────────────────────────────
// Style template catalog
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[allow(dead_code)]
    version: u32,
    default_style: String,
    styles: HashMap<String, Vec<String>>,
}

/// Static mapping from style id to one-or-more prompt templates, loaded once
/// at process start. Absence of the catalog file is non-fatal: the composer
/// then runs in minimal-prompt mode.
#[derive(Debug, Clone)]
pub struct StyleCatalog {
    default_style: String,
    styles: HashMap<String, Vec<String>>,
}

impl StyleCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read style catalog at {}", path.display()))?;
        let file: CatalogFile = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse style catalog at {}", path.display()))?;

        info!(
            "Loaded style catalog: {} styles, default '{}'",
            file.styles.len(),
            file.default_style
        );

        Ok(StyleCatalog {
            default_style: file.default_style,
            styles: file.styles,
        })
    }

    pub fn default_style(&self) -> &str {
        &self.default_style
    }

    /// First template for a style, if the style exists and has any.
    pub fn template_for(&self, style: &str) -> Option<&str> {
        self.styles
            .get(style)
            .and_then(|templates| templates.first())
            .map(|s| s.as_str())
    }

    #[cfg(test)]
    pub fn from_parts(default_style: &str, styles: HashMap<String, Vec<String>>) -> Self {
        StyleCatalog {
            default_style: default_style.to_string(),
            styles,
        }
    }
}
