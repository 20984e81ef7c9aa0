//! Prompt constants and the placeholder substitution helper shared by the
//! composer and the image stage.

/// Line prefix the caption model is instructed to emit. The image stage
/// scans the reply for this marker.
pub const CAPTION_MARKER: &str = "CAPTION:";

/// Caption prompt template.
/// Replace: {topic}, {platform}, {content_type}, {business_name},
///          {industry}, {target_audience}, {brand_voice}
pub const CAPTION_PROMPT_TEMPLATE: &str = r#"Write a social media caption for the following post.

Post:
- Topic: {topic}
- Platform: {platform}
- Content type: {content_type}

Brand:
- Business: {business_name}, operating in {industry}
- Target audience: {target_audience}
- Brand voice: {brand_voice}

Requirements:
- Short and engaging (2-3 sentences maximum)
- Written in the brand voice
- End with 3-5 relevant hashtags
- Return the final caption on a single line prefixed with "CAPTION:""#;

/// Literal `{key}` substitution over a fixed key set. Deliberately not a
/// templating engine: unknown placeholders in the template are left intact
/// so a malformed catalog entry stays visible in the output.
pub fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

/// Simplified retry prompt used when the full composed prompt fails at the
/// image API: style, platform, topic, business name, and industry only — no
/// enhancement layers.
pub fn basic_image_prompt(
    visual_style: &str,
    platform: &str,
    topic: &str,
    business_name: &str,
    industry: &str,
) -> String {
    format!(
        "Create a {visual_style} style social media image for {platform} about {topic}. \
        For {business_name}, a {industry} business. High quality, professional, no text."
    )
}

/// Generic caption used when the caption API fails or omits the marker.
pub fn generic_caption(topic: &str, business_name: &str, hashtags: &[String]) -> String {
    let tags = hashtags
        .iter()
        .take(4)
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    format!("{topic} — insights from {business_name}. {tags}")
        .trim_end()
        .to_string()
}
