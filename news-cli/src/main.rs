mod app;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use news_core::{FileStore, NewsApiClient, SyncConfig, SyncEngine};
use reqwest::{redirect, ClientBuilder};
use tokio::runtime::Runtime;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::app::TextApp;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let runtime = Runtime::new()?;
    let result = runtime.block_on(run());
    // a pending stdin read would otherwise hold up shutdown
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_sync_config();
    config.validate()?;
    if config.api_key.is_empty() {
        warn!("no API key configured; set NEWS_API_KEY or api_key in config.json");
    }

    let client = ClientBuilder::new()
        .redirect(redirect::Policy::limited(5))
        .user_agent("newsfeed/0.1")
        .timeout(config.request_timeout())
        .build()?;
    let source = NewsApiClient::from_config(client, &config)?;
    let store = FileStore::new(cache_dir());

    let engine = SyncEngine::new(config.clone(), Arc::new(store), Arc::new(source));
    let handle = engine.spawn();

    let result = TextApp::new(handle.feed(), config.interval()).run().await;
    handle.stop().await?;
    result
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn config_dir() -> PathBuf {
    // Linux: ~/.config/newsfeed
    let mut dir = dirs::config_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_default();
    dir.push("newsfeed");
    dir
}

fn cache_dir() -> PathBuf {
    let mut dir = dirs::cache_dir().unwrap_or_else(config_dir);
    dir.push("newsfeed");
    dir
}

fn load_sync_config() -> SyncConfig {
    let mut path = config_dir();
    path.push("config.json");
    SyncConfig::from_file(&path)
}
