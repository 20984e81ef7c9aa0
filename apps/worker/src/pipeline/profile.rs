//! Profile loading — business context for a user, with layered defaults.
//!
//! The three-way outcome is load-bearing for the orchestrator:
//! - `Found` with per-field defaults applied → proceed;
//! - `Missing` (no profile row) → skip the entry for a future run;
//! - datastore error → `Found(fallback)` so generic content still ships.

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::datastore::{Datastore, ProfileRow};
use crate::models::context::{
    BusinessContext, DEFAULT_BRAND_TONE, DEFAULT_BRAND_VOICE, DEFAULT_BUSINESS_NAME,
    DEFAULT_INDUSTRY, DEFAULT_PRIMARY_COLOR, DEFAULT_SECONDARY_COLOR, DEFAULT_TARGET_AUDIENCE,
    DEFAULT_UNIQUE_VALUE,
};

#[derive(Debug, Clone)]
pub enum ProfileLookup {
    Found(BusinessContext),
    Missing,
}

/// Field-by-field defaulting over a raw profile row. Idempotent: a complete
/// profile passes through unchanged.
pub fn apply_defaults(row: ProfileRow) -> BusinessContext {
    BusinessContext {
        business_name: non_empty(row.business_name, DEFAULT_BUSINESS_NAME),
        brand_tone: non_empty(row.brand_tone, DEFAULT_BRAND_TONE),
        brand_voice: non_empty(row.brand_voice, DEFAULT_BRAND_VOICE),
        industry: first_or(row.industry, DEFAULT_INDUSTRY),
        target_audience: first_or(row.target_audience, DEFAULT_TARGET_AUDIENCE),
        unique_value: non_empty(row.unique_value_proposition, DEFAULT_UNIQUE_VALUE),
        content_themes: row
            .content_themes
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| vec!["business".to_string(), "growth".to_string()]),
        primary_color: non_empty(row.primary_color, DEFAULT_PRIMARY_COLOR),
        secondary_color: non_empty(row.secondary_color, DEFAULT_SECONDARY_COLOR),
        hashtags: row.hashtags_that_work_well.filter(|h| !h.trim().is_empty()),
    }
}

fn non_empty(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

fn first_or(value: Option<Vec<String>>, default: &str) -> String {
    value
        .and_then(|list| list.into_iter().find(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| default.to_string())
}

/// Loads the business context for a user.
///
/// Datastore errors never propagate: the pipeline degrades to a
/// fully-defaulted context rather than dropping the entry.
pub async fn load_business_context(store: &dyn Datastore, user_id: Uuid) -> ProfileLookup {
    match store.fetch_profile(user_id).await {
        Ok(Some(row)) => {
            let ctx = apply_defaults(row);
            info!("Loaded business context for user {user_id}: {}", ctx.business_name);
            ProfileLookup::Found(ctx)
        }
        Ok(None) => {
            warn!("No profile found for user {user_id}");
            ProfileLookup::Missing
        }
        Err(e) => {
            error!("Error loading business context for user {user_id}: {e}");
            ProfileLookup::Found(BusinessContext::fallback())
        }
    }
}
