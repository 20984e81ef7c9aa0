//! Content synthesis — deterministic templates keyed on content type.
//!
//! One arm per `ContentType` variant; `Other` is the generic single-image
//! fallback for types the planner invents. Script-only types (reel/video)
//! set `generate_script` instead of `generate_image`.

use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::content::{
    CarouselSlide, ContentRecord, EmailElements, ScriptSection,
};
use crate::models::context::BusinessContext;
use crate::models::entry::{CalendarEntry, ContentType};

pub fn synthesize(
    entry: &CalendarEntry,
    ctx: &BusinessContext,
) -> Result<ContentRecord, AppError> {
    let topic = entry
        .topic
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::Validation(format!("Entry {} has no usable topic", entry.id))
        })?
        .to_string();

    let platform = entry
        .platform
        .clone()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| "Instagram".to_string());

    let content_type = entry.content_type();

    let business_name = &ctx.business_name;
    let industry = &ctx.industry;
    let audience = &ctx.target_audience;
    let brand_voice = &ctx.brand_voice;
    let unique_value = &ctx.unique_value;

    let mut record = ContentRecord {
        platform,
        topic: topic.clone(),
        content_type: content_type.clone(),
        title: String::new(),
        content: String::new(),
        hashtags: Vec::new(),
        image_type: "single_image".to_string(),
        aspect_ratio: "1:1".to_string(),
        generate_image: true,
        generate_script: false,
        carousel: None,
        script: None,
        email: None,
        duration: None,
        interactive_elements: None,
    };

    match &content_type {
        ContentType::StaticPost | ContentType::ImagePost => {
            record.title = format!("{business_name}: {topic}");
            record.content = format!(
                "Discover how {business_name} helps {audience} with {topic}. \
                Our {unique_value} makes us the perfect partner for your {industry} needs."
            );
        }
        ContentType::Carousel => {
            record.title = format!("{topic} - Complete Guide by {business_name}");
            record.content = format!(
                "Swipe through our complete guide to {topic}! Our expertise in {industry} \
                helps {audience} achieve better results. Follow along for valuable insights!"
            );
            record.image_type = "carousel".to_string();
            record.carousel = Some(vec![
                CarouselSlide {
                    slide: 1,
                    focus: "Introduction".to_string(),
                    description: format!("Why {topic} matters for {audience}"),
                    image_url: None,
                },
                CarouselSlide {
                    slide: 2,
                    focus: "Key Benefits".to_string(),
                    description: format!("Benefits of {topic} in {industry}"),
                    image_url: None,
                },
                CarouselSlide {
                    slide: 3,
                    focus: "Our Approach".to_string(),
                    description: format!("How {business_name} helps with {topic}"),
                    image_url: None,
                },
                CarouselSlide {
                    slide: 4,
                    focus: "Call to Action".to_string(),
                    description: format!("Next steps for {audience}"),
                    image_url: None,
                },
            ]);
        }
        ContentType::Story => {
            record.title = format!("Quick Tip: {topic}");
            record.content = format!(
                "{topic} tip for {audience} in {industry}! At {business_name}, we believe \
                in {brand_voice} communication. Tap to learn more!"
            );
            record.image_type = "story".to_string();
            record.aspect_ratio = "9:16".to_string();
            record.duration = Some("15 seconds".to_string());
            record.interactive_elements = Some(vec![
                "tap_to_learn_more".to_string(),
                "swipe_up".to_string(),
            ]);
        }
        ContentType::Reel => {
            record.title = format!("{topic} Explained");
            record.content = format!(
                "Watch: How {business_name} helps {audience} with {topic}. \
                Our {industry} expertise makes {unique_value} possible!"
            );
            record.image_type = "video_thumbnail".to_string();
            record.aspect_ratio = "9:16".to_string();
            record.generate_image = false;
            record.generate_script = true;
            record.duration = Some("15-30 seconds".to_string());
            record.script = Some(vec![
                ScriptSection {
                    label: "hook".to_string(),
                    text: format!("Did you know {topic} can transform your {industry} business?"),
                },
                ScriptSection {
                    label: "value".to_string(),
                    text: format!(
                        "At {business_name}, we help {audience} achieve better results with {topic}"
                    ),
                },
                ScriptSection {
                    label: "story".to_string(),
                    text: format!("Here's how {unique_value} makes the difference"),
                },
                ScriptSection {
                    label: "cta".to_string(),
                    text: format!("Learn more about our {industry} solutions!"),
                },
            ]);
        }
        ContentType::Video => {
            record.title = format!("Complete Guide: {topic}");
            record.content = format!(
                "Full video: Everything you need to know about {topic}. \
                Our {industry} experts at {business_name} break it down for {audience}!"
            );
            record.image_type = "video_thumbnail".to_string();
            record.aspect_ratio = "16:9".to_string();
            record.generate_image = false;
            record.generate_script = true;
            record.duration = Some("5-15 minutes".to_string());
            record.script = Some(vec![
                ScriptSection {
                    label: "introduction".to_string(),
                    text: format!("Welcome to {business_name}'s complete guide to {topic}"),
                },
                ScriptSection {
                    label: "main_content".to_string(),
                    text: format!(
                        "Detailed explanation of {topic} for {audience} in {industry}"
                    ),
                },
                ScriptSection {
                    label: "expert_insights".to_string(),
                    text: format!("Why {unique_value} matters"),
                },
                ScriptSection {
                    label: "conclusion".to_string(),
                    text: format!("How {business_name} can help you with {topic}"),
                },
            ]);
        }
        ContentType::Email => {
            record.title = format!("Important: {topic}");
            record.content = format!(
                "Subject: {topic} - Insights for {audience}\n\n\
                Dear valued {audience},\n\n\
                We're excited to share our latest insights on {topic}. As leaders in \
                {industry}, {business_name} has helped countless organizations achieve \
                better results.\n\n\
                Our {unique_value} approach ensures you get the best possible outcomes.\n\n\
                Best regards,\n{business_name} Team"
            );
            record.image_type = "email_header".to_string();
            record.aspect_ratio = "16:9".to_string();
            record.email = Some(EmailElements {
                subject: format!("{topic} - Insights for {audience}"),
                preview_text: format!("Discover how {business_name} can help with {topic}"),
                body: format!("Comprehensive information about {topic} for {audience}"),
                cta: format!("Learn more about our {industry} solutions"),
            });
        }
        ContentType::Other(raw) => {
            debug!("Unknown content type '{raw}', using generic single-image template");
            record.title = format!("{business_name} - {topic}");
            record.content = format!(
                "Exciting news from {business_name}! We're sharing insights about {topic} \
                that matter to {audience} in {industry}."
            );
        }
    }

    record.hashtags = build_hashtags(ctx, &topic, &content_type);

    info!(
        "Generated {} content for {business_name} about: {topic}",
        content_type.as_str()
    );

    Ok(record)
}

/// Hashtag generation: a precomputed list from the profile is used verbatim;
/// otherwise fixed base tags plus per-content-type extras. Order-preserving.
fn build_hashtags(ctx: &BusinessContext, topic: &str, content_type: &ContentType) -> Vec<String> {
    if let Some(precomputed) = &ctx.hashtags {
        return precomputed
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
    }

    let mut tags = vec![
        "#Business".to_string(),
        "#Success".to_string(),
        format!("#{}", hashtag_token(&ctx.industry)),
        format!("#{}", hashtag_token(topic)),
    ];

    match content_type {
        ContentType::Carousel => {
            tags.push("#Carousel".to_string());
            tags.push("#Swipe".to_string());
        }
        ContentType::Story => {
            tags.push("#Stories".to_string());
            tags.push("#BehindTheScenes".to_string());
        }
        ContentType::Reel | ContentType::Video => {
            tags.push("#Reels".to_string());
            tags.push("#ShortVideo".to_string());
        }
        _ => {}
    }

    tags
}

/// "spring sale" → "SpringSale": spaces removed, each word capitalized.
fn hashtag_token(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().to_string() + chars.as_str(),
            }
        })
        .collect()
}
