//! Pipeline orchestrator — drives the per-entry stages in sequence and
//! isolates failures: no entry's failure blocks the rest of the batch.
//!
//! Flow per entry: claim → resolve user → load context → synthesize →
//! (classify → compose → image stage) → persist → mark generated.

use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::entry::CalendarEntry;
use crate::pipeline::composer::compose_prompt;
use crate::pipeline::persist::{build_content_row, persist_content};
use crate::pipeline::profile::{load_business_context, ProfileLookup};
use crate::pipeline::styles::classify_style;
use crate::pipeline::synthesizer::synthesize;
use crate::state::PipelineDeps;

#[derive(Debug, PartialEq, Eq)]
enum EntryOutcome {
    Completed,
    Skipped(&'static str),
}

/// Processes every pending entry once, sequentially. A failing work-queue
/// query ends the run cleanly with zero processed.
pub async fn run_batch(deps: &PipelineDeps) {
    info!("Starting content generation run...");

    let entries = match deps.store.fetch_pending_entries().await {
        Ok(entries) => entries,
        Err(e) => {
            error!("Failed to query pending calendar entries: {e}");
            return;
        }
    };

    if entries.is_empty() {
        info!("No calendar entries need content generation");
        return;
    }

    info!("Found {} calendar entries to process", entries.len());

    let mut completed = 0usize;
    for entry in &entries {
        match process_entry(deps, entry).await {
            Ok(EntryOutcome::Completed) => {
                info!("Successfully processed entry {}", entry.id);
                completed += 1;
            }
            Ok(EntryOutcome::Skipped(reason)) => {
                info!("Skipped entry {}: {reason}", entry.id);
            }
            Err(e) => {
                // Entry-fatal: log with the entry id, release the claim so a
                // future run retries, and keep going.
                error!("Error processing entry {}: {e}", entry.id);
                release_quietly(deps, entry).await;
            }
        }
    }

    info!(
        "Content generation run completed: {completed}/{} entries",
        entries.len()
    );
}

async fn process_entry(
    deps: &PipelineDeps,
    entry: &CalendarEntry,
) -> Result<EntryOutcome, AppError> {
    info!(
        "Processing calendar entry {} for calendar {}",
        entry.id, entry.calendar_id
    );

    // Claim before any work; a concurrent run that already claimed the
    // entry wins and this run moves on.
    if !deps.store.claim_entry(entry.id).await? {
        return Ok(EntryOutcome::Skipped("already claimed by another run"));
    }

    let user_id = match deps.store.calendar_owner(entry.calendar_id).await? {
        Some(user_id) => user_id,
        None => {
            warn!("No calendar found for calendar_id {}", entry.calendar_id);
            release_quietly(deps, entry).await;
            return Ok(EntryOutcome::Skipped("calendar not found"));
        }
    };

    let ctx = match load_business_context(deps.store.as_ref(), user_id).await {
        ProfileLookup::Found(ctx) => ctx,
        ProfileLookup::Missing => {
            warn!("No business context found for user {user_id}");
            release_quietly(deps, entry).await;
            return Ok(EntryOutcome::Skipped("no business context"));
        }
    };

    let record = match synthesize(entry, &ctx) {
        Ok(record) => record,
        Err(e) => {
            warn!("Content synthesis failed for entry {}, will retry next run: {e}", entry.id);
            release_quietly(deps, entry).await;
            return Ok(EntryOutcome::Skipped("unusable entry fields"));
        }
    };

    let theme = entry.content_theme.as_deref().unwrap_or("");
    let style = classify_style(theme, &ctx, entry.visual_style.as_deref());

    // Image success is not required: a text-only result still completes
    // the entry.
    let asset = if record.generate_image {
        let prompt = compose_prompt(deps.catalog.as_ref(), style, theme, &ctx, &record);
        deps.image_stage
            .run(&prompt, style, entry, &record, &ctx)
            .await
    } else {
        None
    };

    let row = build_content_row(entry, &record, style, asset.as_ref());
    persist_content(deps.store.as_ref(), &row).await;

    deps.store.mark_generated(entry.id).await?;

    Ok(EntryOutcome::Completed)
}

/// Best-effort release; a failure here only means the entry stays claimed
/// until an operator or a later run resolves it.
async fn release_quietly(deps: &PipelineDeps, entry: &CalendarEntry) {
    if let Err(e) = deps.store.release_entry(entry.id).await {
        warn!("Failed to release claim on entry {}: {e}", entry.id);
    }
}
