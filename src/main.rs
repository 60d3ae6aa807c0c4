//! Lotwatch binary: one collection cycle per invocation, meant to be
//! triggered by an external scheduler every ~10 minutes.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lotwatch::config::Settings;
use lotwatch::cycle::run_cycle;
use lotwatch::scrape::HttpSource;
use lotwatch::store::{DatasetStore, FsBlobStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lotwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env();
    let source = Arc::new(HttpSource::new(&settings)?);
    let blob = Arc::new(FsBlobStore::new(settings.data_dir.clone()));
    let store = DatasetStore::new(blob, settings.blob_path.clone());

    // The cycle logs its own report; a failure propagates as a non-zero exit.
    run_cycle(source, &store, settings.workers).await?;
    Ok(())
}
