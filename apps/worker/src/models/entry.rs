use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One unit of scheduled content work, owned by the calendar subsystem.
///
/// The pipeline only ever flips `content` false→true and moves `status` to
/// `content_generated`; it never deletes entries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CalendarEntry {
    pub id: Uuid,
    pub calendar_id: Uuid,
    pub entry_date: Option<NaiveDate>,
    pub content_type: String,
    pub content_theme: Option<String>,
    pub topic: Option<String>,
    pub platform: Option<String>,
    pub visual_style: Option<String>,
    pub tone: Option<String>,
    pub creativity: Option<f64>,
    pub text_in_image: Option<bool>,
    pub status: String,
    pub content: bool,
}

impl CalendarEntry {
    pub fn content_type(&self) -> ContentType {
        ContentType::parse(&self.content_type)
    }
}

/// Closed set of content types the synthesizer dispatches on.
///
/// Unknown strings land in `Other` — the explicit generic-image branch, not
/// an error. Adding a type here is a compile-time-checked change: every
/// `match` over this enum must grow an arm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    StaticPost,
    ImagePost,
    Carousel,
    Story,
    Reel,
    Video,
    Email,
    Other(String),
}

impl ContentType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "static_post" => ContentType::StaticPost,
            "image_post" => ContentType::ImagePost,
            "carousel" => ContentType::Carousel,
            "story" => ContentType::Story,
            // The planner historically emitted both spellings for reels.
            "reel" | "short_video" | "short_video or reel" => ContentType::Reel,
            "video" | "long_video" => ContentType::Video,
            "email" => ContentType::Email,
            other => ContentType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ContentType::StaticPost => "static_post",
            ContentType::ImagePost => "image_post",
            ContentType::Carousel => "carousel",
            ContentType::Story => "story",
            ContentType::Reel => "reel",
            ContentType::Video => "video",
            ContentType::Email => "email",
            ContentType::Other(raw) => raw.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_types() {
        assert_eq!(ContentType::parse("static_post"), ContentType::StaticPost);
        assert_eq!(ContentType::parse("carousel"), ContentType::Carousel);
        assert_eq!(ContentType::parse("Story"), ContentType::Story);
        assert_eq!(ContentType::parse("email"), ContentType::Email);
    }

    #[test]
    fn test_parse_reel_aliases() {
        assert_eq!(ContentType::parse("reel"), ContentType::Reel);
        assert_eq!(ContentType::parse("short_video"), ContentType::Reel);
        assert_eq!(
            ContentType::parse("short_video or reel"),
            ContentType::Reel
        );
        assert_eq!(ContentType::parse("long_video"), ContentType::Video);
    }

    #[test]
    fn test_parse_unknown_falls_through_to_other() {
        let parsed = ContentType::parse("podcast");
        assert_eq!(parsed, ContentType::Other("podcast".to_string()));
        assert_eq!(parsed.as_str(), "podcast");
    }
}
