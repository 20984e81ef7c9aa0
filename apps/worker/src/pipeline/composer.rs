//! Prompt composition — fills the selected style template with context
//! variables, then layers mandatory brand and content-type directives on
//! top. This stage never fails: a missing style falls back to the catalog's
//! default style, and a missing catalog falls back to a minimal prompt.

use chrono::Utc;
use tracing::warn;

use crate::models::content::ContentRecord;
use crate::models::context::BusinessContext;
use crate::models::entry::ContentType;
use crate::pipeline::prompts::substitute;
use crate::pipeline::styles::StyleCatalog;

pub fn compose_prompt(
    catalog: Option<&StyleCatalog>,
    style: &str,
    content_theme: &str,
    ctx: &BusinessContext,
    record: &ContentRecord,
) -> String {
    let base = match catalog {
        Some(catalog) => fill_template(catalog, style, content_theme, ctx, record),
        None => minimal_prompt(ctx, &record.topic),
    };

    // Mandatory second pass, regardless of which branch produced the base.
    let mut prompt = base;
    prompt.push_str(&brand_directives(ctx, record));
    prompt.push_str(&content_type_directives(record));
    prompt
}

fn fill_template(
    catalog: &StyleCatalog,
    style: &str,
    content_theme: &str,
    ctx: &BusinessContext,
    record: &ContentRecord,
) -> String {
    let template = match catalog.template_for(style) {
        Some(t) => t,
        None => {
            warn!(
                "No template for style '{style}', falling back to default style '{}'",
                catalog.default_style()
            );
            match catalog.template_for(catalog.default_style()) {
                Some(t) => t,
                None => return minimal_prompt(ctx, &record.topic),
            }
        }
    };

    let now = Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
    let brand_colors = format!(
        "primary {} / secondary {}",
        ctx.primary_color, ctx.secondary_color
    );

    substitute(
        template,
        &[
            ("current_datetime", &now),
            ("business_name", &ctx.business_name),
            ("industry", &ctx.industry),
            ("target_audience", &ctx.target_audience),
            ("brand_tone", &ctx.brand_tone),
            ("brand_voice", &ctx.brand_voice),
            ("brand_colors", &brand_colors),
            ("location", "your location"),
            ("title", &record.title),
            ("content", &record.content),
            ("topic", &record.topic),
            ("platform", &record.platform),
            ("content_theme", content_theme),
            ("aspect_ratio", &record.aspect_ratio),
        ],
    )
}

/// Used for every entry when the catalog could not be loaded at startup.
fn minimal_prompt(ctx: &BusinessContext, topic: &str) -> String {
    format!(
        "Create a clean, high-quality social media image for {} about {topic}. \
        Use the brand primary color {}.",
        ctx.business_name, ctx.primary_color
    )
}

fn brand_directives(ctx: &BusinessContext, record: &ContentRecord) -> String {
    format!(
        "\n\nBrand requirements:\n\
        - Use brand colors: primary {} and secondary {}\n\
        - Reflect the {} brand tone of {}\n\
        - Speak to {} in the {} industry\n\
        - Aspect ratio: {}",
        ctx.primary_color,
        ctx.secondary_color,
        ctx.brand_tone,
        ctx.business_name,
        ctx.target_audience,
        ctx.industry,
        record.aspect_ratio
    )
}

fn content_type_directives(record: &ContentRecord) -> String {
    let mut out = String::from("\n\nFormat requirements:\n");
    match &record.content_type {
        ContentType::StaticPost | ContentType::ImagePost => {
            out.push_str("- Square single-image layout with space for a text overlay");
        }
        ContentType::Carousel => {
            let slide_count = record.carousel.as_ref().map(|s| s.len()).unwrap_or(4);
            out.push_str(&format!(
                "- Design as slide 1 of a cohesive {slide_count}-slide carousel series"
            ));
            if let Some(first) = record.carousel.as_ref().and_then(|s| s.first()) {
                out.push_str(&format!("\n- First slide focus: {}", first.description));
            }
        }
        ContentType::Story => {
            out.push_str("- Vertical story format optimized for mobile viewing");
            if record.interactive_elements.is_some() {
                out.push_str("\n- Leave room for interactive call-to-action overlays");
            }
        }
        ContentType::Reel | ContentType::Video => {
            out.push_str("- Eye-catching video thumbnail design to maximize click-through rate");
        }
        ContentType::Email => {
            out.push_str("- Email header/banner suitable for marketing campaigns");
        }
        ContentType::Other(_) => {
            out.push_str("- Clean, versatile single-image layout");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record() -> ContentRecord {
        ContentRecord {
            platform: "Instagram".to_string(),
            topic: "Spring Sale".to_string(),
            content_type: ContentType::StaticPost,
            title: "Acme: Spring Sale".to_string(),
            content: "body".to_string(),
            hashtags: vec![],
            image_type: "single_image".to_string(),
            aspect_ratio: "1:1".to_string(),
            generate_image: true,
            generate_script: false,
            carousel: None,
            script: None,
            email: None,
            duration: None,
            interactive_elements: None,
        }
    }

    fn catalog() -> StyleCatalog {
        let mut styles = HashMap::new();
        styles.insert(
            "modern".to_string(),
            vec!["A {brand_tone} image for {business_name} about {topic}".to_string()],
        );
        StyleCatalog::from_parts("modern", styles)
    }

    #[test]
    fn test_template_substitution() {
        let ctx = BusinessContext::fallback();
        let prompt = compose_prompt(Some(&catalog()), "modern", "promo", &ctx, &record());
        assert!(prompt.starts_with("A professional image for Our Business about Spring Sale"));
    }

    #[test]
    fn test_missing_style_falls_back_to_default_template() {
        let ctx = BusinessContext::fallback();
        let prompt = compose_prompt(Some(&catalog()), "cinematic", "promo", &ctx, &record());
        assert!(prompt.contains("about Spring Sale"), "default template must be used");
    }

    #[test]
    fn test_missing_catalog_yields_minimal_prompt() {
        let ctx = BusinessContext::fallback();
        let prompt = compose_prompt(None, "modern", "promo", &ctx, &record());
        assert!(prompt.contains("Our Business"));
        assert!(prompt.contains(&ctx.primary_color));
    }

    #[test]
    fn test_directives_appended_on_every_branch() {
        let ctx = BusinessContext::fallback();
        for prompt in [
            compose_prompt(Some(&catalog()), "modern", "promo", &ctx, &record()),
            compose_prompt(None, "modern", "promo", &ctx, &record()),
        ] {
            assert!(prompt.contains("Brand requirements:"));
            assert!(prompt.contains("Format requirements:"));
            assert!(prompt.contains("Aspect ratio: 1:1"));
        }
    }

    #[test]
    fn test_carousel_directive_names_first_slide() {
        let ctx = BusinessContext::fallback();
        let mut r = record();
        r.content_type = ContentType::Carousel;
        r.carousel = Some(vec![crate::models::content::CarouselSlide {
            slide: 1,
            focus: "Introduction".to_string(),
            description: "Why Spring Sale matters".to_string(),
            image_url: None,
        }]);
        let prompt = compose_prompt(Some(&catalog()), "modern", "promo", &ctx, &r);
        assert!(prompt.contains("1-slide carousel series"));
        assert!(prompt.contains("Why Spring Sale matters"));
    }
}
