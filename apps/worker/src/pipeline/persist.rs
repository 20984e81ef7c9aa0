//! Persistence stage — merges the content record and the generated asset
//! into one output row. Insert failures are logged with full diagnostics and
//! never cross the entry boundary.

use chrono::Utc;
use serde_json::json;
use tracing::error;

use crate::datastore::{ContentRow, Datastore};
use crate::models::content::{ContentRecord, GeneratedAsset, ScriptSection};
use crate::models::entry::CalendarEntry;

/// Builds the single output row for an entry. Pure: all fallbacks (missing
/// asset, missing script) are resolved here.
pub fn build_content_row(
    entry: &CalendarEntry,
    record: &ContentRecord,
    style: &str,
    asset: Option<&GeneratedAsset>,
) -> ContentRow {
    let body = asset
        .map(|a| a.caption.clone())
        .unwrap_or_else(|| record.content.clone());

    let carousel_urls: Option<Vec<String>> = record.carousel.as_ref().map(|slides| {
        slides
            .iter()
            .filter_map(|s| s.image_url.clone())
            .collect::<Vec<_>>()
    });
    let carousel_urls = carousel_urls.filter(|urls| !urls.is_empty());

    ContentRow {
        calendar_id: entry.calendar_id,
        platform: record.platform.to_lowercase(),
        content_type: record.content_type.as_str().to_lowercase(),
        title: record.title.clone(),
        body,
        hashtags: record.hashtags.clone(),
        status: "generated".to_string(),
        metadata: json!({
            "source_entry_id": entry.id,
            "content_theme": entry.content_theme,
            "visual_style": style,
            "topic": record.topic,
            "generated_at": Utc::now().to_rfc3339(),
            "generated_by": "content-worker",
        }),
        image_url: asset.map(|a| a.url.clone()),
        carousel_urls,
        script_text: record.script.as_deref().map(format_script),
        scheduled_date: entry.entry_date,
    }
}

/// Joins script sections with labeled headers:
/// `HOOK:\n...\n\nVALUE:\n...`
fn format_script(sections: &[ScriptSection]) -> String {
    sections
        .iter()
        .map(|s| format!("{}:\n{}", s.label.to_uppercase(), s.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Writes the row; failure is terminal for this stage only.
pub async fn persist_content(store: &dyn Datastore, row: &ContentRow) {
    if let Err(e) = store.insert_content(row).await {
        error!(
            "Failed to persist content row (calendar {}, title '{}', type {}): {e}",
            row.calendar_id, row.title, row.content_type
        );
    }
}
