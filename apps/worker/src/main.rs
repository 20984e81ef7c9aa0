use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use worker::config::Config;
use worker::datastore::PgStore;
use worker::db::create_pool;
use worker::image_client::{HttpAssetFetcher, OpenAiImageClient};
use worker::llm_client::OpenAiCaptionClient;
use worker::pipeline::image::ImageStage;
use worker::pipeline::orchestrator::run_batch;
use worker::pipeline::styles::StyleCatalog;
use worker::state::PipelineDeps;
use worker::storage::{build_s3_client, S3Store};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting content worker v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url).await?;

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Initialize API clients
    let image_client = OpenAiImageClient::new(config.openai_api_key.clone());
    let caption_client = OpenAiCaptionClient::new(config.openai_api_key.clone());
    info!("Image and caption clients initialized");

    // Load the style template catalog; absence is non-fatal (minimal-prompt
    // mode for every entry).
    let catalog = match StyleCatalog::load(Path::new(&config.style_catalog_path)) {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            warn!("Style catalog unavailable, using minimal prompts: {e:#}");
            None
        }
    };

    let deps = PipelineDeps {
        store: Arc::new(PgStore::new(pool)),
        image_stage: ImageStage {
            generator: Arc::new(image_client),
            fetcher: Arc::new(HttpAssetFetcher::new()),
            store: Arc::new(S3Store::new(
                s3,
                config.s3_bucket.clone(),
                config.s3_endpoint.clone(),
            )),
            captioner: Arc::new(caption_client),
        },
        catalog,
    };

    run_batch(&deps).await;

    Ok(())
}
