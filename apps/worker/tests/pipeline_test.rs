//! End-to-end pipeline tests against an in-memory datastore and mock API
//! clients: batch isolation, skip conditions, and the full static_post
//! scenario.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use uuid::Uuid;

use worker::datastore::{ContentRow, Datastore, ProfileRow};
use worker::errors::AppError;
use worker::image_client::{AssetFetcher, ImageError, ImageGenerator, ImageRequest};
use worker::llm_client::{CaptionError, CaptionModel};
use worker::models::entry::CalendarEntry;
use worker::pipeline::image::ImageStage;
use worker::pipeline::orchestrator::run_batch;
use worker::state::PipelineDeps;
use worker::storage::AssetStore;

// ────────────────────────────────────────────────────────────────────────────
// In-memory datastore
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct MemStore {
    entries: Mutex<Vec<CalendarEntry>>,
    owners: HashMap<Uuid, Uuid>,
    profiles: HashMap<Uuid, ProfileRow>,
    /// Calendar ids whose owner lookup fails.
    failing_calendars: HashSet<Uuid>,
    /// User ids whose profile lookup fails.
    failing_profiles: HashSet<Uuid>,
    inserted: Mutex<Vec<ContentRow>>,
}

impl MemStore {
    fn entry_status(&self, id: Uuid) -> (bool, String) {
        let entries = self.entries.lock().unwrap();
        let e = entries.iter().find(|e| e.id == id).expect("entry exists");
        (e.content, e.status.clone())
    }
}

#[async_trait]
impl Datastore for MemStore {
    async fn fetch_pending_entries(&self) -> Result<Vec<CalendarEntry>, AppError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| !e.content)
            .cloned()
            .collect())
    }

    async fn calendar_owner(&self, calendar_id: Uuid) -> Result<Option<Uuid>, AppError> {
        if self.failing_calendars.contains(&calendar_id) {
            return Err(AppError::Validation("simulated calendar failure".to_string()));
        }
        Ok(self.owners.get(&calendar_id).copied())
    }

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<ProfileRow>, AppError> {
        if self.failing_profiles.contains(&user_id) {
            return Err(AppError::Validation("simulated profile failure".to_string()));
        }
        Ok(self.profiles.get(&user_id).cloned())
    }

    async fn claim_entry(&self, entry_id: Uuid) -> Result<bool, AppError> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.iter_mut().find(|e| e.id == entry_id);
        match entry {
            Some(e) if !e.content && e.status != "processing" => {
                e.status = "processing".to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_entry(&self, entry_id: Uuid) -> Result<(), AppError> {
        let mut entries = self.entries.lock().unwrap();
        if let Some(e) = entries.iter_mut().find(|e| e.id == entry_id && !e.content) {
            e.status = "pending".to_string();
        }
        Ok(())
    }

    async fn mark_generated(&self, entry_id: Uuid) -> Result<(), AppError> {
        let mut entries = self.entries.lock().unwrap();
        if let Some(e) = entries.iter_mut().find(|e| e.id == entry_id) {
            e.content = true;
            e.status = "content_generated".to_string();
        }
        Ok(())
    }

    async fn insert_content(&self, row: &ContentRow) -> Result<(), AppError> {
        self.inserted.lock().unwrap().push(row.clone());
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Mock API clients
// ────────────────────────────────────────────────────────────────────────────

struct HappyGenerator;

#[async_trait]
impl ImageGenerator for HappyGenerator {
    async fn generate(&self, _request: &ImageRequest) -> Result<Vec<String>, ImageError> {
        Ok(vec!["https://img.example/tmp.png".to_string()])
    }
}

struct FailingGenerator;

#[async_trait]
impl ImageGenerator for FailingGenerator {
    async fn generate(&self, _request: &ImageRequest) -> Result<Vec<String>, ImageError> {
        Err(ImageError::EmptyResponse)
    }
}

struct StaticFetcher;

#[async_trait]
impl AssetFetcher for StaticFetcher {
    async fn fetch(&self, _url: &str) -> Result<Bytes, ImageError> {
        Ok(Bytes::from_static(b"png"))
    }
}

struct EchoStore;

#[async_trait]
impl AssetStore for EchoStore {
    async fn put(&self, key: &str, _bytes: Bytes, _ct: &str) -> Result<String, AppError> {
        Ok(format!("https://cdn.example/{key}"))
    }
}

struct MarkerCaptioner;

#[async_trait]
impl CaptionModel for MarkerCaptioner {
    async fn complete(&self, _prompt: &str) -> Result<String, CaptionError> {
        Ok("CAPTION: Fresh finds for spring! #SpringSale".to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────

fn entry(calendar_id: Uuid, topic: &str) -> CalendarEntry {
    CalendarEntry {
        id: Uuid::new_v4(),
        calendar_id,
        entry_date: NaiveDate::from_ymd_opt(2026, 3, 1),
        content_type: "static_post".to_string(),
        content_theme: Some("seasonal promotion".to_string()),
        topic: Some(topic.to_string()),
        platform: Some("Instagram".to_string()),
        visual_style: None,
        tone: None,
        creativity: None,
        text_in_image: Some(true),
        status: "pending".to_string(),
        content: false,
    }
}

fn acme_profile() -> ProfileRow {
    ProfileRow {
        business_name: Some("Acme".to_string()),
        brand_tone: Some("professional".to_string()),
        brand_voice: Some("confident and innovative".to_string()),
        industry: Some(vec!["retail".to_string()]),
        target_audience: Some(vec!["shoppers".to_string()]),
        unique_value_proposition: Some("same-day delivery".to_string()),
        content_themes: Some(vec!["deals".to_string()]),
        primary_color: Some("#102030".to_string()),
        secondary_color: Some("#a0b0c0".to_string()),
        hashtags_that_work_well: None,
    }
}

fn deps(store: Arc<MemStore>) -> PipelineDeps {
    PipelineDeps {
        store,
        image_stage: ImageStage {
            generator: Arc::new(HappyGenerator),
            fetcher: Arc::new(StaticFetcher),
            store: Arc::new(EchoStore),
            captioner: Arc::new(MarkerCaptioner),
        },
        catalog: None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_one_failing_entry_does_not_block_the_batch() {
    let user = Uuid::new_v4();
    let good_cal_1 = Uuid::new_v4();
    let bad_cal = Uuid::new_v4();
    let good_cal_2 = Uuid::new_v4();

    let e1 = entry(good_cal_1, "Spring Sale");
    let e2 = entry(bad_cal, "Summer Launch");
    let e3 = entry(good_cal_2, "Autumn Deals");
    let (id1, id2, id3) = (e1.id, e2.id, e3.id);

    let store = Arc::new(MemStore {
        entries: Mutex::new(vec![e1, e2, e3]),
        owners: HashMap::from([(good_cal_1, user), (good_cal_2, user)]),
        profiles: HashMap::from([(user, acme_profile())]),
        failing_calendars: HashSet::from([bad_cal]),
        ..MemStore::default()
    });

    run_batch(&deps(store.clone())).await;

    assert_eq!(store.entry_status(id1), (true, "content_generated".to_string()));
    assert_eq!(store.entry_status(id3), (true, "content_generated".to_string()));
    let (done, status) = store.entry_status(id2);
    assert!(!done, "failing entry must stay unprocessed");
    assert_eq!(status, "pending", "failing entry must be released for retry");
    assert_eq!(store.inserted.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_profile_lookup_error_degrades_to_generic_content() {
    let user = Uuid::new_v4();
    let cal = Uuid::new_v4();
    let e = entry(cal, "Spring Sale");
    let id = e.id;

    let store = Arc::new(MemStore {
        entries: Mutex::new(vec![e]),
        owners: HashMap::from([(cal, user)]),
        failing_profiles: HashSet::from([user]),
        ..MemStore::default()
    });

    run_batch(&deps(store.clone())).await;

    // Datastore error ≠ missing profile: the entry still completes, with
    // fully-defaulted branding.
    assert_eq!(store.entry_status(id), (true, "content_generated".to_string()));
    let rows = store.inserted.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "Our Business: Spring Sale");
}

#[tokio::test]
async fn test_missing_profile_skips_entry_untouched() {
    let user = Uuid::new_v4();
    let cal = Uuid::new_v4();
    let e = entry(cal, "Spring Sale");
    let id = e.id;

    let store = Arc::new(MemStore {
        entries: Mutex::new(vec![e]),
        owners: HashMap::from([(cal, user)]),
        ..MemStore::default()
    });

    run_batch(&deps(store.clone())).await;

    let (done, status) = store.entry_status(id);
    assert!(!done, "entry without a profile must be left for a future run");
    assert_eq!(status, "pending");
    assert!(store.inserted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_static_post_end_to_end() {
    let user = Uuid::new_v4();
    let cal = Uuid::new_v4();
    let e = entry(cal, "Spring Sale");
    let id = e.id;

    let store = Arc::new(MemStore {
        entries: Mutex::new(vec![e]),
        owners: HashMap::from([(cal, user)]),
        profiles: HashMap::from([(user, acme_profile())]),
        ..MemStore::default()
    });

    run_batch(&deps(store.clone())).await;

    assert_eq!(store.entry_status(id), (true, "content_generated".to_string()));

    let rows = store.inserted.lock().unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.title, "Acme: Spring Sale");
    assert_eq!(row.platform, "instagram");
    assert_eq!(row.content_type, "static_post");
    assert_eq!(row.status, "generated");
    for tag in ["#Business", "#Retail", "#SpringSale"] {
        assert!(
            row.hashtags.contains(&tag.to_string()),
            "hashtags must include {tag}, got {:?}",
            row.hashtags
        );
    }
    // Caption from the marker line is preferred over the synthesized body.
    assert_eq!(row.body, "Fresh finds for spring! #SpringSale");
    let url = row.image_url.as_deref().expect("image URL persisted");
    assert!(url.starts_with("https://cdn.example/cron_generated/Spring_Sale_"));
}

#[tokio::test]
async fn test_image_failure_still_completes_entry_without_asset() {
    let user = Uuid::new_v4();
    let cal = Uuid::new_v4();
    let e = entry(cal, "Spring Sale");
    let id = e.id;

    let store = Arc::new(MemStore {
        entries: Mutex::new(vec![e]),
        owners: HashMap::from([(cal, user)]),
        profiles: HashMap::from([(user, acme_profile())]),
        ..MemStore::default()
    });

    let deps = PipelineDeps {
        store: store.clone(),
        image_stage: ImageStage {
            generator: Arc::new(FailingGenerator),
            fetcher: Arc::new(StaticFetcher),
            store: Arc::new(EchoStore),
            captioner: Arc::new(MarkerCaptioner),
        },
        catalog: None,
    };

    run_batch(&deps).await;

    // Partial success: text content with no image still completes the entry.
    assert_eq!(store.entry_status(id), (true, "content_generated".to_string()));
    let rows = store.inserted.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].image_url.is_none());
    assert!(rows[0].body.contains("Acme"), "synthesized body used when no caption");
}

#[tokio::test]
async fn test_already_claimed_entry_is_skipped() {
    let user = Uuid::new_v4();
    let cal = Uuid::new_v4();
    let mut e = entry(cal, "Spring Sale");
    e.status = "processing".to_string();
    let id = e.id;

    let store = Arc::new(MemStore {
        entries: Mutex::new(vec![e]),
        owners: HashMap::from([(cal, user)]),
        profiles: HashMap::from([(user, acme_profile())]),
        ..MemStore::default()
    });

    run_batch(&deps(store.clone())).await;

    let (done, _) = store.entry_status(id);
    assert!(!done, "a claimed entry must not be double-processed");
    assert!(store.inserted.lock().unwrap().is_empty());
}
