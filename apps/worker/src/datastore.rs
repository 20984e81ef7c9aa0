//! Datastore seam — every table the pipeline touches goes through the
//! `Datastore` trait so the orchestrator can run against an in-memory
//! substitute in tests.
//!
//! Production implementation: `PgStore` over sqlx/Postgres.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::entry::CalendarEntry;

/// Raw profile row as stored, before defaulting. Every field is optional;
/// `pipeline::profile::apply_defaults` fills the gaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub business_name: Option<String>,
    pub brand_tone: Option<String>,
    pub brand_voice: Option<String>,
    pub industry: Option<Vec<String>>,
    pub target_audience: Option<Vec<String>>,
    pub unique_value_proposition: Option<String>,
    pub content_themes: Option<Vec<String>>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub hashtags_that_work_well: Option<String>,
}

/// The single row written to the content table per processed entry.
/// Built by `pipeline::persist::build_content_row`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRow {
    pub calendar_id: Uuid,
    pub platform: String,
    pub content_type: String,
    pub title: String,
    pub body: String,
    pub hashtags: Vec<String>,
    pub status: String,
    pub metadata: serde_json::Value,
    pub image_url: Option<String>,
    pub carousel_urls: Option<Vec<String>>,
    pub script_text: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
}

#[async_trait]
pub trait Datastore: Send + Sync {
    /// All entries still waiting for content (`content = false`).
    async fn fetch_pending_entries(&self) -> Result<Vec<CalendarEntry>, AppError>;

    /// Resolves the owning user of a calendar, if the calendar exists.
    async fn calendar_owner(&self, calendar_id: Uuid) -> Result<Option<Uuid>, AppError>;

    /// Profile row for a user; `None` when no profile exists.
    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<ProfileRow>, AppError>;

    /// Conditionally claims an entry for this run. Returns false when the
    /// entry holds a live claim from another run; a claim whose holder
    /// crashed becomes reclaimable after [`STALE_CLAIM_MINUTES`].
    async fn claim_entry(&self, entry_id: Uuid) -> Result<bool, AppError>;

    /// Releases a claimed entry back to `pending` so a later run retries it.
    async fn release_entry(&self, entry_id: Uuid) -> Result<(), AppError>;

    /// Terminal transition: `content = true`, `status = 'content_generated'`.
    async fn mark_generated(&self, entry_id: Uuid) -> Result<(), AppError>;

    /// Inserts the finished content row.
    async fn insert_content(&self, row: &ContentRow) -> Result<(), AppError>;
}

/// A `processing` claim older than this is treated as abandoned (the run
/// that held it died mid-entry) and may be claimed again.
pub const STALE_CLAIM_MINUTES: i64 = 30;

fn stale_claim_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::minutes(STALE_CLAIM_MINUTES)
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Datastore for PgStore {
    async fn fetch_pending_entries(&self) -> Result<Vec<CalendarEntry>, AppError> {
        Ok(sqlx::query_as::<_, CalendarEntry>(
            r#"
            SELECT id, calendar_id, entry_date, content_type, content_theme,
                   topic, platform, visual_style, tone, creativity,
                   text_in_image, status, content
            FROM calendar_entries
            WHERE content = false
            ORDER BY entry_date NULLS LAST, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn calendar_owner(&self, calendar_id: Uuid) -> Result<Option<Uuid>, AppError> {
        Ok(sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM social_media_calendars WHERE id = $1",
        )
        .bind(calendar_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<ProfileRow>, AppError> {
        Ok(sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT business_name, brand_tone, brand_voice, industry,
                   target_audience, unique_value_proposition, content_themes,
                   primary_color, secondary_color, hashtags_that_work_well
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn claim_entry(&self, entry_id: Uuid) -> Result<bool, AppError> {
        // Conditional update is the lease: a second run racing on the same
        // entry sees rows_affected = 0 and skips it. Stale claims (crashed
        // holder, updated_at past the cutoff) are claimable again.
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE calendar_entries
            SET status = 'processing', updated_at = $2
            WHERE id = $1 AND content = false
              AND (status <> 'processing' OR updated_at < $3)
            "#,
        )
        .bind(entry_id)
        .bind(now)
        .bind(stale_claim_cutoff(now))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn release_entry(&self, entry_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE calendar_entries
            SET status = 'pending', updated_at = $2
            WHERE id = $1 AND content = false
            "#,
        )
        .bind(entry_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_generated(&self, entry_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE calendar_entries
            SET content = true, status = 'content_generated', updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(entry_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_content(&self, row: &ContentRow) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO generated_content
                (id, calendar_id, platform, content_type, title, body,
                 hashtags, status, metadata, image_url, carousel_urls,
                 script_text, scheduled_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(row.calendar_id)
        .bind(&row.platform)
        .bind(&row.content_type)
        .bind(&row.title)
        .bind(&row.body)
        .bind(&row.hashtags)
        .bind(&row.status)
        .bind(&row.metadata)
        .bind(&row.image_url)
        .bind(&row.carousel_urls)
        .bind(&row.script_text)
        .bind(row.scheduled_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
